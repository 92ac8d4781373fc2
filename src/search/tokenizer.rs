use tantivy::Index;
use tantivy::tokenizer::{RemoveLongFilter, TextAnalyzer, Token, TokenStream, Tokenizer};
use tracing::debug;

use super::common::MAX_TERM_LENGTH;
use super::normalizer::normalize;

/// Tokenizer name registered on the index for all record fields
pub const FOLDING_TOKENIZER_NAME: &str = "folded";

/// Split already-normalized text into terms.
///
/// The returned iterator is lazy and can be cloned to restart it.
pub fn terms(normalized: &str) -> impl Iterator<Item = &str> + Clone {
    normalized.split_whitespace().filter(|term| !term.is_empty())
}

/// Tokenizer that normalizes text and splits it on whitespace.
///
/// Offsets refer to the normalized text, not the raw input.
#[derive(Clone, Debug, Default)]
pub struct FoldingTokenizer;

pub struct FoldingTokenStream {
    tokens: std::vec::IntoIter<Token>,
    current: Token,
}

impl Tokenizer for FoldingTokenizer {
    type TokenStream<'a> = FoldingTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> FoldingTokenStream {
        let folded = normalize(text);

        let mut tokens = Vec::new();
        let mut offset = 0;
        for (position, part) in folded.split(' ').enumerate() {
            if !part.is_empty() {
                tokens.push(Token {
                    offset_from: offset,
                    offset_to: offset + part.len(),
                    position,
                    text: part.to_string(),
                    position_length: 1,
                });
            }
            offset += part.len() + 1;
        }

        FoldingTokenStream {
            tokens: tokens.into_iter(),
            current: Token::default(),
        }
    }
}

impl TokenStream for FoldingTokenStream {
    fn advance(&mut self) -> bool {
        match self.tokens.next() {
            Some(token) => {
                self.current = token;
                true
            }
            None => false,
        }
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }
}

/// Register the folding analyzer on an index
pub fn register_folding_tokenizer(index: &Index) {
    debug!("Registering folding tokenizer");

    let analyzer = TextAnalyzer::builder(FoldingTokenizer)
        .filter(RemoveLongFilter::limit(MAX_TERM_LENGTH))
        .build();

    index
        .tokenizers()
        .register(FOLDING_TOKENIZER_NAME, analyzer);
}
