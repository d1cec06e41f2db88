//! Reading observation corpora.
//!
//! A corpus file holds one observation sequence per CSV record. Every field of a record is a
//! single `p:q` symbol token; records may have different lengths and there is no header row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::*;
use crate::symbol::Symbol;

/// A training or evaluation corpus: a list of observation sequences.
pub type Corpus = Vec<Vec<Symbol>>;

pub fn read_corpus_path<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    read_corpus(File::open(path)?)
}

pub fn read_corpus<R: Read>(rdr: R) -> Result<Corpus> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut corpus = Corpus::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let sequence = record
            .iter()
            .filter(|field| !field.is_empty())
            .enumerate()
            .map(|(j, field)| {
                field.parse::<Symbol>().map_err(|err| {
                    HmmError::Parse(format!("record {}, field {}: {}", i, j, err))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        // blank lines carry no observations
        if !sequence.is_empty() {
            corpus.push(sequence);
        }
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_records() {
        let data = "1:2,0:0,3:1\n2:2\n\n1:1, 1:2\n";
        let corpus = read_corpus(data.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[0], vec![Symbol::new(1, 2), Symbol::SILENT, Symbol::new(3, 1)]);
        assert_eq!(corpus[1], vec![Symbol::new(2, 2)]);
        assert_eq!(corpus[2], vec![Symbol::new(1, 1), Symbol::new(1, 2)]);
    }

    #[test]
    fn reports_bad_token_position() {
        let err = read_corpus("1:1,x\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("record 0, field 1"));
    }
}
