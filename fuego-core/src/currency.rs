use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Tokens the wallet knows by symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    Sol,
    Usdc,
    Usdt,
    Bonk,
    Jup,
}

impl Token {
    pub const ALL: [Token; 5] = [Token::Sol, Token::Usdc, Token::Usdt, Token::Bonk, Token::Jup];

    /// Tokens accepted by `send`.
    pub const TRANSFERABLE: [Token; 3] = [Token::Sol, Token::Usdc, Token::Usdt];

    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Sol => "SOL",
            Token::Usdc => "USDC",
            Token::Usdt => "USDT",
            Token::Bonk => "BONK",
            Token::Jup => "JUP",
        }
    }

    /// Mainnet mint address. SOL is represented by the wrapped SOL mint.
    pub fn mint(&self) -> &'static str {
        match self {
            Token::Sol => "So11111111111111111111111111111111111111112",
            Token::Usdc => "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            Token::Usdt => "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
            Token::Bonk => "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            Token::Jup => "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Token::Sol => 9,
            Token::Usdc | Token::Usdt | Token::Jup => 6,
            Token::Bonk => 5,
        }
    }

    pub fn supported_list() -> String {
        Token::ALL
            .iter()
            .map(|t| t.symbol())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Token {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::ALL
            .into_iter()
            .find(|t| t.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                WalletError::validation(format!(
                    "Unknown token '{}'. Supported: {}",
                    s,
                    Token::supported_list()
                ))
            })
    }
}

/// A swap leg: either a known symbol or a raw 44-character mint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapAsset {
    Known(Token),
    Mint(String),
}

impl SwapAsset {
    pub fn mint(&self) -> &str {
        match self {
            SwapAsset::Known(token) => token.mint(),
            SwapAsset::Mint(mint) => mint,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SwapAsset::Known(token) => token.symbol().to_string(),
            SwapAsset::Mint(mint) => mint.clone(),
        }
    }
}

impl FromStr for SwapAsset {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(token) = s.parse::<Token>() {
            return Ok(SwapAsset::Known(token));
        }
        if s.len() == 44 && crate::address::is_valid_address(s) {
            return Ok(SwapAsset::Mint(s.to_string()));
        }
        Err(WalletError::validation(format!(
            "Unknown token '{}'. Supported: {}",
            s,
            Token::supported_list()
        )))
    }
}

/// An amount in a token's smallest unit, carrying the token's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    units: u64,
    decimals: u32,
}

impl Amount {
    pub fn from_smallest_unit(units: u64, decimals: u32) -> Self {
        Amount { units, decimals }
    }

    pub fn from_lamports(lamports: u64) -> Self {
        Amount::from_smallest_unit(lamports, Token::Sol.decimals())
    }

    pub fn as_smallest_unit(&self) -> u64 {
        self.units
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    fn conversion_factor(&self) -> u64 {
        10u64.pow(self.decimals)
    }

    /// Whole-token rendering with trailing zeros trimmed, e.g. `1.5` or `0`.
    pub fn to_decimal_string(&self) -> String {
        let factor = self.conversion_factor();
        let integer_part = self.units / factor;
        let fractional_part = self.units % factor;

        if fractional_part == 0 {
            return integer_part.to_string();
        }

        let fractional_str = format!(
            "{:0width$}",
            fractional_part,
            width = self.decimals as usize
        );
        format!("{}.{}", integer_part, fractional_str.trim_end_matches('0'))
    }

    /// Parses a decimal string such as `0.25` at the given precision.
    pub fn parse(s: &str, decimals: u32) -> WalletResult<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 2 {
            return Err(WalletError::validation(format!(
                "Invalid amount '{}': multiple decimal points",
                s
            )));
        }

        let integer_str = parts[0];
        let fractional_str = parts.get(1).copied().unwrap_or("");

        if integer_str.is_empty() && fractional_str.is_empty() {
            return Err(WalletError::validation(format!("Invalid amount '{}'", s)));
        }

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(integer_str) || !all_digits(fractional_str) {
            return Err(WalletError::validation(format!(
                "Invalid amount '{}': expected a decimal number",
                s
            )));
        }

        if fractional_str.len() > decimals as usize {
            return Err(WalletError::validation(format!(
                "Too many decimal places in '{}'. Max {} allowed.",
                s, decimals
            )));
        }

        let factor = 10u64.pow(decimals);
        let parsed_integer = if integer_str.is_empty() {
            0
        } else {
            integer_str
                .parse::<u64>()
                .map_err(|e| WalletError::validation(format!("Invalid amount '{}': {}", s, e)))?
        };

        let mut units = parsed_integer
            .checked_mul(factor)
            .ok_or_else(|| WalletError::validation(format!("Amount '{}' is too large", s)))?;

        if !fractional_str.is_empty() {
            let padded = format!("{:0<width$}", fractional_str, width = decimals as usize);
            let parsed_fractional = padded
                .parse::<u64>()
                .map_err(|e| WalletError::validation(format!("Invalid amount '{}': {}", s, e)))?;
            units = units
                .checked_add(parsed_fractional)
                .ok_or_else(|| WalletError::validation(format!("Amount '{}' is too large", s)))?;
        }

        Ok(Amount { units, decimals })
    }

    /// Like [`Amount::parse`] but rejects zero.
    pub fn parse_positive(s: &str, decimals: u32) -> WalletResult<Self> {
        let amount = Self::parse(s, decimals)?;
        if amount.is_zero() {
            return Err(WalletError::validation(format!(
                "Invalid amount '{}'. Please provide a positive number.",
                s
            )));
        }
        Ok(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}
