use std::ffi::OsStr;
use std::fs::File;
use std::io::{stderr, stdout, BufRead, BufReader, Error, ErrorKind, Read, Write};
use std::path::Path;

use flate2::read;

/// Creates a `Writer` object.
///
/// Attempts to open a file under a given name. However, if the name is `"stdout"` or `"stderr"`,
/// the returned `Writer` will be connected to either `stdout` or `stderr` stream, respectively.
/// Empty file name also results in writing to `stdout`.
///
/// # Arguments
/// * `out_fname` - file name, `"stdout"` or `"stderr"`
/// * `if_append` - existing file will be removed if false, otherwise the new content will be appended
pub fn out_writer(out_fname: &str, if_append: bool) -> Box<dyn Write + Send> {
    match out_fname {
        "" => Box::new(stdout()) as Box<dyn Write + Send>,
        "stdout" => Box::new(stdout()) as Box<dyn Write + Send>,
        "stderr" => Box::new(stderr()) as Box<dyn Write + Send>,
        _ => {
            let path = Path::new(out_fname);

            if if_append {
                let file = match File::options().append(true).create(true).open(&path) {
                    Ok(file) => file,
                    Err(e) => panic!("can't open >{:?}<, error is: {:?}", &path, e),
                };
                Box::new(file) as Box<dyn Write + Send>
            } else {
                let file = match File::create(&path) {
                    Ok(file) => file,
                    Err(e) => panic!("can't open >{:?}<, error is: {:?}", &path, e),
                };
                Box::new(file) as Box<dyn Write + Send>
            }
        }
    }
}

/// Opens a file for reading.
///
/// This function can open a regular file or a gzipped one, as determined by the extension
/// of the input file name. A boxed reader to the content is returned.
pub fn open_file(filename: &str) -> Result<Box<dyn BufRead>, Error> {
    let path = Path::new(filename);
    let file = match File::open(path) {
        Err(_) => {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Can't open a file: {}", filename),
            ))
        }
        Ok(file) => file,
    };

    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufReader::with_capacity(
            128 * 1024,
            read::GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(128 * 1024, file)))
    }
}

/// Reads the whole content of a file into a single string.
pub fn read_to_string(filename: &str) -> Result<String, Error> {
    let mut reader = open_file(filename)?;
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(buffer)
}
