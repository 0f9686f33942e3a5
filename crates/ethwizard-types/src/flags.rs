// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Typed editing of service argument vectors
//!
//! An argument vector is parsed into tokens that remember how each flag was
//! written (`--name=value`, `--name value` or a bare `--name`), so a value can
//! be rewritten in place and the vector rendered back without disturbing any
//! other element.

use serde::{Deserialize, Serialize};

/// How a flag and its value are laid out in the argument vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FlagStyle {
    /// `--name=value`, one element
    Equals,
    /// `--name value`, two elements
    Separate,
    /// `--name`, no value
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Token {
    Flag {
        name: String,
        style: FlagStyle,
        value: Option<String>,
    },
    Positional(String),
}

impl Token {
    fn flag_name(&self) -> Option<&str> {
        match self {
            Self::Flag { name, .. } => Some(name),
            Self::Positional(_) => None,
        }
    }

    fn render_into(&self, args: &mut Vec<String>) {
        match self {
            Self::Flag {
                name,
                style: FlagStyle::Equals,
                value,
            } => args.push(format!("{name}={}", value.as_deref().unwrap_or_default())),
            Self::Flag {
                name,
                style: FlagStyle::Separate,
                value,
            } => {
                args.push(name.clone());
                if let Some(value) = value {
                    args.push(value.clone());
                }
            }
            Self::Flag { name, .. } => args.push(name.clone()),
            Self::Positional(arg) => args.push(arg.clone()),
        }
    }
}

fn is_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-')
}

/// A parsed argument vector.
///
/// Rendering a freshly parsed list gives back the original vector element
/// for element. Flag names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagList {
    tokens: Vec<Token>,
}

impl FlagList {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let mut tokens = Vec::with_capacity(args.len());
        let mut iter = args.into_iter().peekable();

        while let Some(arg) = iter.next() {
            if !is_flag(&arg) {
                tokens.push(Token::Positional(arg));
                continue;
            }

            if let Some((name, value)) = arg.split_once('=') {
                tokens.push(Token::Flag {
                    name: name.to_owned(),
                    style: FlagStyle::Equals,
                    value: Some(value.to_owned()),
                });
            } else if iter.peek().is_some_and(|next| !is_flag(next)) {
                tokens.push(Token::Flag {
                    name: arg,
                    style: FlagStyle::Separate,
                    value: iter.next(),
                });
            } else {
                tokens.push(Token::Flag {
                    name: arg,
                    style: FlagStyle::Bare,
                    value: None,
                });
            }
        }

        Self { tokens }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            token.render_into(&mut args);
        }
        args
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens
            .iter()
            .filter_map(Token::flag_name)
            .any(|flag| flag.eq_ignore_ascii_case(name))
    }

    /// Value of the last occurrence of a flag, which is the one clients honour
    pub fn value(&self, name: &str) -> Option<&str> {
        self.tokens.iter().rev().find_map(|token| match token {
            Token::Flag {
                name: flag, value, ..
            } if flag.eq_ignore_ascii_case(name) => value.as_deref(),
            _ => None,
        })
    }

    /// Set a flag's value.
    ///
    /// Every existing occurrence keeps its position and spelling and only its
    /// value changes; a bare occurrence becomes `--name=value`. When the flag
    /// is absent the `--name value` pair is appended.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut found = false;

        for token in &mut self.tokens {
            if let Token::Flag {
                name: flag,
                style,
                value: current,
            } = token
                && flag.eq_ignore_ascii_case(name)
            {
                if *style == FlagStyle::Bare {
                    *style = FlagStyle::Equals;
                }
                *current = Some(value.clone());
                found = true;
            }
        }

        if !found {
            self.tokens.push(Token::Flag {
                name: name.to_owned(),
                style: FlagStyle::Separate,
                value: Some(value),
            });
        }
    }
}

/// Whether every flag in `required` appears in `args` (case-insensitive).
///
/// Scanning stops as soon as all of them have been seen. An empty `required`
/// list is trivially satisfied.
pub fn contains_all_flags<S: AsRef<str>>(args: &[S], required: &[&str]) -> bool {
    let mut seen = vec![false; required.len()];
    let mut remaining = required.len();

    for arg in args {
        if remaining == 0 {
            break;
        }
        let arg = arg.as_ref();
        let flag = arg.split_once('=').map_or(arg, |(name, _)| name);
        for (index, name) in required.iter().enumerate() {
            if !seen[index] && flag.eq_ignore_ascii_case(name) {
                seen[index] = true;
                remaining -= 1;
            }
        }
    }

    remaining == 0
}
