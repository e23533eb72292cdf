use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: [Quote; 7] = [
    Quote {
        text: "Success is not final, failure is not fatal: it is the courage to continue that counts.",
        author: "Winston Churchill",
    },
    Quote {
        text: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    Quote {
        text: "It does not matter how slowly you go as long as you do not stop.",
        author: "Confucius",
    },
    Quote {
        text: "The future depends on what you do today.",
        author: "Mahatma Gandhi",
    },
    Quote {
        text: "Don't count the days, make the days count.",
        author: "Muhammad Ali",
    },
    Quote {
        text: "The only limit to our realization of tomorrow will be our doubts of today.",
        author: "Franklin D. Roosevelt",
    },
    Quote {
        text: "The way to get started is to quit talking and begin doing.",
        author: "Walt Disney",
    },
];

/// Sum of the character codes of `YYYY-MM-DD`, modulo `len`.
pub fn quote_index(date: NaiveDate, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let key = date.format("%Y-%m-%d").to_string();
    key.chars().map(|c| c as usize).sum::<usize>() % len
}

/// The quote shown for the whole of `date`.
pub fn quote_for(date: NaiveDate) -> &'static Quote {
    &QUOTES[quote_index(date, QUOTES.len())]
}
