//! Word and line-break tokens for typing-paced output.
//!
//! [`Words`] turns a chunk stream into [`Token`]s: each line is a phrase, and
//! each phrase is split on whitespace into words. A word cut by a chunk
//! boundary is held until the next chunk completes it, up to `max_word_len`
//! bytes; longer runs are emitted as they stand so memory stays bounded by
//! the chunk size.
//!
//! Splitting is on runs of whitespace rather than on single spaces, and a
//! trailing newline closes the last phrase instead of opening an empty one:
//! `"hi  there\nbye\n"` renders as `"hi there \nbye \n"` (five tokens), not
//! with an empty word for the doubled space or a bare `" \n"` at the end.

use crate::config::DEFAULT_BUFFER_SIZE;
use crate::error::StreamError;
use crate::source::Chunk;
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Word(String),
    LineBreak,
}

impl Token {
    /// Append the wire form: `"<word> "` or `"\n"`.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        match self {
            Token::Word(w) => {
                out.extend_from_slice(w.as_bytes());
                out.push(b' ');
            }
            Token::LineBreak => out.push(b'\n'),
        }
    }
}

/// Iterator adapter from chunks to tokens. See the module docs.
pub struct Words<I> {
    chunks: I,
    pending: VecDeque<Token>,
    partial: String,
    max_word_len: usize,
    open_phrase: bool,
    done: bool,
}

/// Tokenize a chunk stream with the default word-length bound.
pub fn words<I>(chunks: I) -> Words<I::IntoIter>
where
    I: IntoIterator<Item = Result<Chunk, StreamError>>,
{
    Words::new(chunks.into_iter(), DEFAULT_BUFFER_SIZE)
}

impl<I> Words<I>
where
    I: Iterator<Item = Result<Chunk, StreamError>>,
{
    #[must_use]
    pub fn new(chunks: I, max_word_len: usize) -> Self {
        Self {
            chunks,
            pending: VecDeque::new(),
            partial: String::new(),
            max_word_len: max_word_len.max(1),
            open_phrase: false,
            done: false,
        }
    }

    fn flush_word(&mut self) {
        if !self.partial.is_empty() {
            self.pending.push_back(Token::Word(std::mem::take(&mut self.partial)));
        }
    }

    fn absorb(&mut self, chunk: &Chunk) {
        for c in chunk.as_str().chars() {
            if c == '\n' {
                self.flush_word();
                self.pending.push_back(Token::LineBreak);
                self.open_phrase = false;
            } else if c.is_whitespace() {
                self.flush_word();
            } else {
                self.partial.push(c);
                self.open_phrase = true;
                if self.partial.len() >= self.max_word_len {
                    self.flush_word();
                }
            }
        }
    }

    fn close(&mut self) {
        self.flush_word();
        if self.open_phrase {
            self.pending.push_back(Token::LineBreak);
            self.open_phrase = false;
        }
        self.done = true;
    }
}

impl<I> Iterator for Words<I>
where
    I: Iterator<Item = Result<Chunk, StreamError>>,
{
    type Item = Result<Token, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.chunks.next() {
                Some(Ok(chunk)) => self.absorb(&chunk),
                Some(Err(e)) => {
                    self.done = true;
                    self.partial.clear();
                    return Some(Err(e));
                }
                None => self.close(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&str]) -> Vec<Result<Chunk, StreamError>> {
        let mut offset = 0;
        parts
            .iter()
            .map(|p| {
                let c = Chunk::new(*p, offset);
                offset += p.len() as u64;
                Ok(c)
            })
            .collect()
    }

    fn render(tokens: &[Token]) -> String {
        let mut out = Vec::new();
        for t in tokens {
            t.render_into(&mut out);
        }
        String::from_utf8(out).unwrap()
    }

    fn tokenize(parts: &[&str]) -> Vec<Token> {
        words(chunks(parts)).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn phrases_and_words_in_order() {
        let tokens = tokenize(&["hi there\nbye"]);
        assert_eq!(
            tokens,
            vec![
                Token::Word("hi".into()),
                Token::Word("there".into()),
                Token::LineBreak,
                Token::Word("bye".into()),
                Token::LineBreak,
            ]
        );
        assert_eq!(render(&tokens), "hi there \nbye \n");
    }

    #[test]
    fn word_split_across_chunks_is_rejoined() {
        assert_eq!(render(&tokenize(&["hel", "lo wor", "ld\n"])), "hello world \n");
    }

    #[test]
    fn trailing_newline_does_not_add_an_empty_phrase() {
        assert_eq!(render(&tokenize(&["a b\n"])), "a b \n");
    }

    #[test]
    fn doubled_spaces_and_final_newline_add_no_empty_tokens() {
        let tokens = tokenize(&["hi  there\nbye\n"]);
        assert_eq!(tokens.len(), 5);
        assert_eq!(render(&tokens), "hi there \nbye \n");
    }

    #[test]
    fn blank_lines_are_kept_as_line_breaks() {
        assert_eq!(render(&tokenize(&["a\n\nb"])), "a \n\nb \n");
    }

    #[test]
    fn crlf_and_runs_of_spaces_collapse() {
        assert_eq!(render(&tokenize(&["a   b\r\nc\t d"])), "a b \nc d \n");
    }

    #[test]
    fn overlong_words_are_emitted_in_pieces() {
        let tokens: Vec<Token> = Words::new(chunks(&["abcdefgh"]).into_iter(), 3)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(render(&tokens), "abc def gh \n");
    }

    #[test]
    fn source_error_ends_the_stream() {
        let input = vec![
            Ok(Chunk::new("one two", 0)),
            Err(StreamError::SourceNotFound {
                path: "gone.txt".into(),
            }),
            Ok(Chunk::new("never", 7)),
        ];
        let mut it = words(input);
        assert_eq!(it.next().unwrap().unwrap(), Token::Word("one".into()));
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(tokenize(&[]).is_empty());
    }
}
