use std::io::{BufRead, Error, ErrorKind};

/// Splits a line into whitespace-separated tokens.
///
/// Tabs are treated as spaces; repeated separators produce no empty tokens.
pub fn split_into_strings(line: &str) -> Vec<String> {
    line.split_whitespace().map(|t| t.to_string()).collect()
}

/// Reads a table of numbers from a whitespace-separated text file.
///
/// Blank lines and lines starting with `#` are skipped. Every remaining line
/// must tokenize into values parsable as `f64`; rows may differ in length.
pub fn read_table<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>, Error> {
    let mut data: Vec<Vec<f64>> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row: Result<Vec<f64>, _> = trimmed.split_whitespace().map(|t| t.parse::<f64>()).collect();
        match row {
            Ok(values) => data.push(values),
            Err(_) => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Can't parse a numeric table row: {}", trimmed),
                ))
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn read_numeric_table() {
        let txt = "# a comment\n0 0  3.4 4.5 5.4\n\n0 1\t3.9 5.0 6.1\n";
        let rows: Vec<Vec<f64>> = read_table(BufReader::new(txt.as_bytes())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 5);
        assert!((rows[1][2] - 3.9).abs() < 1e-10);
    }

    #[test]
    fn split_handles_tabs() {
        let tokens = split_into_strings("SurpassContactEnergy\t0.8  2.0 -2.0 0.2");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], "SurpassContactEnergy");
    }
}
