//! tagshift Lexer
//!
//! Tokenizes shorthand abbreviations (`div#page>ul>li.item$*3{Item $}`) into a
//! stream of tokens: element names, `#id` / `.class` / `[attr]` / `{text}`
//! modifiers, `*N` multipliers, and the `>` `+` `^` `(` `)` operators.
//!
//! # Example
//!
//! ```
//! use tagshift_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("ul>li*2");
//! assert_eq!(tokens[1].kind, TokenKind::Child);
//! assert_eq!(tokens.len(), 5); // ul > li *2 EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{is_tag_char, is_void_element, RawAttribute, Span, Token, TokenKind, VOID_ELEMENTS};
