//! ZYAML token scanner.
//!
//! Turns YAML source text into a normalized token stream: every document is
//! delimited by `DocumentStart` / `DocumentEnd`, every block collection by an
//! explicit start token and a `BlockEnd`, and mapping keys are marked as such.
//! A parser built on top of the stream never has to look at indentation.
//!
//! # Scanning Pipeline
//!
//! The scanner operates in two phases, pulled lazily one token at a time:
//!
//! 1. **Raw Scanner**: Reads characters and produces primitive tokens
//!    (indicators, scalars, properties, directives, document markers),
//!    tracking flow collection nesting. It knows nothing about block
//!    structure beyond the indentation it is told about.
//!
//! 2. **Auto-Fill**: Applies one rule per primitive token, inserting the
//!    document and block collection markers the source left implicit and
//!    deciding which scalars are mapping keys. All structural errors are
//!    raised here.

mod autofill;
mod context;
mod cursor;
mod error;
mod scanner;
mod simple_key;
mod stream;
mod token;

pub use autofill::YamlVersion;
pub use error::{ErrorKind, Location, Result, ScanError};
pub use stream::TokenStream;
pub use token::{ScalarStyle, Token, TokenKind};

/// Scan a YAML source string into a lazy token stream.
///
/// # Example
///
/// ```
/// use libzyaml::scan;
///
/// let tokens: Vec<String> = scan("key: value")
///     .map(|token| token.unwrap().to_string())
///     .collect();
/// assert_eq!(tokens[2], "KeyScalar[1,1] key");
/// ```
pub fn scan(input: &str) -> TokenStream<'_> {
    scan_with_filename(input, None)
}

/// Scan a YAML source string with a filename for error messages.
pub fn scan_with_filename<'a>(input: &'a str, filename: Option<&str>) -> TokenStream<'a> {
    TokenStream::new(input, error::ScanContext::new(filename))
}

/// Scan the whole input, stopping at the first error.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    scan(input).collect()
}
