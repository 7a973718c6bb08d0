//! External token-list documents and their resolution.

pub mod lists;
pub mod resolver;

pub use lists::{
    fetch_token_lists, TokenExtensions, TokenInfo, TokenListDoc, TokenListError, TOKEN_LIST_URLS,
};
pub use resolver::TokenResolver;
