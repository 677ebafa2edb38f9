// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Minimal Solidity ABI head/tail codec covering the poll contract's argument and return shapes.

use ledger_client::PollRecord;
use sha3::{Digest, Keccak256};
use thiserror::Error;

pub const WORD: usize = 32;
/// `Error(string)` revert payload selector.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("payload truncated reading {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
    #[error("value at offset {offset} does not fit in 64 bits")]
    Overflow { offset: usize },
    #[error("invalid bool word at offset {offset}")]
    InvalidBool { offset: usize },
    #[error("invalid utf-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("candidate names ({names}) and vote counts ({counts}) differ in length")]
    LengthMismatch { names: usize, counts: usize },
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Argument values the poll contract accepts.
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Uint(u64),
    Str(&'a str),
    StrArray(&'a [String]),
}

pub fn encode_call(selector: [u8; 4], tokens: &[Token<'_>]) -> Vec<u8> {
    let mut out = selector.to_vec();
    out.extend(encode_tuple(tokens));
    out
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_tuple(tokens: &[Token<'_>]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        match token {
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Str(value) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                tail.extend(encode_string(value));
            }
            Token::StrArray(values) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                tail.extend(encode_string_array(values));
            }
        }
    }
    head.extend(tail);
    head
}

fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

fn encode_string_array(values: &[String]) -> Vec<u8> {
    let mut out = uint_word(values.len() as u64).to_vec();
    let tokens: Vec<Token<'_>> = values.iter().map(|v| Token::Str(v)).collect();
    out.extend(encode_tuple(&tokens));
    out
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or(AbiError::Truncated {
            offset,
            needed: WORD,
        })
}

pub fn read_uint(data: &[u8], offset: usize) -> Result<u64, AbiError> {
    let word = word_at(data, offset)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow { offset });
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(tail))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = read_uint(data, offset)?;
    usize::try_from(value).map_err(|_| AbiError::Overflow { offset })
}

pub fn read_bool(data: &[u8], offset: usize) -> Result<bool, AbiError> {
    match read_uint(data, offset) {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(AbiError::InvalidBool { offset }),
    }
}

/// Dynamic string whose pointer sits in the head word at `offset`.
pub fn read_string(data: &[u8], offset: usize) -> Result<String, AbiError> {
    let start = read_usize(data, offset)?;
    let len = read_usize(data, start)?;
    let body = start + WORD;
    let bytes = data
        .get(body..body.saturating_add(len))
        .ok_or(AbiError::Truncated {
            offset: body,
            needed: len,
        })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8 { offset: body })
}

fn read_array_len(data: &[u8], start: usize) -> Result<usize, AbiError> {
    let len = read_usize(data, start)?;
    let available = data.len().saturating_sub(start + WORD) / WORD;
    if len > available {
        return Err(AbiError::Truncated {
            offset: start + WORD,
            needed: len.saturating_mul(WORD),
        });
    }
    Ok(len)
}

pub fn read_string_array(data: &[u8], offset: usize) -> Result<Vec<String>, AbiError> {
    let start = read_usize(data, offset)?;
    let len = read_array_len(data, start)?;
    let elements = &data[start + WORD..];
    (0..len).map(|idx| read_string(elements, idx * WORD)).collect()
}

pub fn read_uint_array(data: &[u8], offset: usize) -> Result<Vec<u64>, AbiError> {
    let start = read_usize(data, offset)?;
    let len = read_array_len(data, start)?;
    (0..len)
        .map(|idx| read_uint(data, start + WORD + idx * WORD))
        .collect()
}

/// Decodes the `(string, bool, string[], uint256[])` returned by `getPoll`.
pub fn decode_poll_record(data: &[u8]) -> Result<PollRecord, AbiError> {
    let title = read_string(data, 0)?;
    let active = read_bool(data, WORD)?;
    let candidate_names = read_string_array(data, 2 * WORD)?;
    let vote_counts = read_uint_array(data, 3 * WORD)?;
    if candidate_names.len() != vote_counts.len() {
        return Err(AbiError::LengthMismatch {
            names: candidate_names.len(),
            counts: vote_counts.len(),
        });
    }
    Ok(PollRecord {
        title,
        active,
        candidate_names,
        vote_counts,
    })
}

/// Reason string of an `Error(string)` revert payload.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&ERROR_STRING_SELECTOR[..])?;
    read_string(body, 0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(data: &[u8]) -> Vec<String> {
        data.chunks(WORD).map(hex::encode).collect()
    }

    fn padded_text(text: &str) -> String {
        let mut word = [0u8; WORD];
        word[..text.len()].copy_from_slice(text.as_bytes());
        hex::encode(word)
    }

    fn num(value: u64) -> String {
        hex::encode(uint_word(value))
    }

    #[test]
    fn selectors_match_known_signatures() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("Error(string)"), ERROR_STRING_SELECTOR);
    }

    #[test]
    fn create_poll_uses_head_tail_layout() {
        let candidates = vec!["Red".to_string(), "Blue".to_string()];
        let data = encode_call(
            [0xde, 0xad, 0xbe, 0xef],
            &[Token::Str("Color"), Token::StrArray(&candidates)],
        );
        assert_eq!(&data[..4], &[0xde, 0xad, 0xbe, 0xef]);
        let body = words(&data[4..]);
        assert_eq!(
            body,
            vec![
                num(0x40), // title pointer
                num(0x80), // candidates pointer
                num(5),
                padded_text("Color"),
                num(2),
                num(0x40),
                num(0x80),
                num(3),
                padded_text("Red"),
                num(4),
                padded_text("Blue"),
            ]
        );
    }

    #[test]
    fn vote_arguments_are_static_words() {
        let data = encode_call([0, 0, 0, 1], &[Token::Uint(0), Token::Uint(1)]);
        assert_eq!(data.len(), 4 + 2 * WORD);
        assert_eq!(words(&data[4..]), vec![num(0), num(1)]);
    }

    fn poll_payload(counts_len: u64) -> Vec<u8> {
        let mut hex_words = vec![
            num(0x80), // title
            num(1),    // active
            num(0xc0), // names
            num(0x1a0), // counts
            num(5),
            padded_text("Color"),
            num(2),
            num(0x40),
            num(0x80),
            num(3),
            padded_text("Red"),
            num(4),
            padded_text("Blue"),
            num(counts_len),
        ];
        hex_words.push(num(3));
        hex_words.push(num(1));
        hex::decode(hex_words.concat()).unwrap()
    }

    #[test]
    fn decodes_get_poll_tuple() {
        let record = decode_poll_record(&poll_payload(2)).unwrap();
        assert_eq!(record.title, "Color");
        assert!(record.active);
        assert_eq!(record.candidate_names, vec!["Red", "Blue"]);
        assert_eq!(record.vote_counts, vec![3, 1]);
    }

    #[test]
    fn mismatched_candidate_arrays_are_rejected() {
        let err = decode_poll_record(&poll_payload(1)).unwrap_err();
        assert_eq!(err, AbiError::LengthMismatch { names: 2, counts: 1 });
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let mut word = [0u8; WORD];
        word[0] = 1;
        assert_eq!(read_uint(&word, 0), Err(AbiError::Overflow { offset: 0 }));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let payload = poll_payload(2);
        assert!(matches!(
            decode_poll_record(&payload[..100]),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn revert_reason_is_decoded() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        let body = [num(0x20), num(14), padded_text("Poll has ended")].concat();
        data.extend(hex::decode(body).unwrap());
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("Poll has ended"));
        assert_eq!(decode_revert_reason(&[0x12, 0x34]), None);
    }
}
