//! Helper macros for writing simulation output.

/// Create a directory and all of its parents, printing the target path.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        {
            println!(":: mkdir -p {}", $dir.display());
            std::fs::create_dir_all(&$dir)
                .unwrap_or_else(|_| {
                    panic!("couldn't create directory {:?}", $dir)
                });
        }
    }
}

/// Write a series of arrays to a `.npz` archive, printing the target path.
#[macro_export]
macro_rules! write_npz {
    (
        $path:expr,
        arrays: { $( $name:expr => $arr:expr ),* $(,)? }
    ) => {
        {
            println!(":: writing {}", $path.display());
            let mut npz
                = ndarray_npy::NpzWriter::new(
                    std::fs::File::create(&$path)
                        .unwrap_or_else(|_| {
                            panic!("couldn't create file {:?}", $path)
                        })
                );
            $(
                npz.add_array($name, $arr)
                    .unwrap_or_else(|_| {
                        panic!("couldn't write array {:?}", $name)
                    });
            )*
            npz.finish()
                .unwrap_or_else(|_| {
                    panic!("couldn't finish writing {:?}", $path)
                });
        }
    }
}
