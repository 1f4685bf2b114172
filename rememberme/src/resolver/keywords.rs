//! Relationship keyword table

use lazy_static::lazy_static;

lazy_static! {
    /// Built-in categories in precedence order
    static ref DEFAULT_TABLE: KeywordTable = KeywordTable::from_pairs(&[
        ("daughter", &["daughter"]),
        ("son", &["son"]),
        ("wife", &["wife", "spouse"]),
        ("husband", &["husband", "spouse"]),
        ("granddaughter", &["granddaughter", "grandchild"]),
        ("grandson", &["grandson", "grandchild"]),
        ("mother", &["mother", "mom", "mum"]),
        ("father", &["father", "dad"]),
        ("sister", &["sister"]),
        ("brother", &["brother"]),
    ]);
}

/// A relationship category and the words that point to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCategory {
    /// Canonical relationship, compared against roster relationships
    pub name: String,
    /// Lowercase surface keywords
    pub keywords: Vec<String>,
}

/// Ordered mapping from relationship category to surface keywords
///
/// Order is precedence: when an utterance hits several categories the first
/// one in the table wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    categories: Vec<KeywordCategory>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl KeywordTable {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        let mut table = Self::empty();
        for (category, keywords) in pairs {
            table.extend(category, keywords.iter().copied());
        }
        table
    }

    /// Add keywords to `category`
    ///
    /// Keywords for an existing category are appended to it; a new category is
    /// appended at the end of the table. Keywords are lowercased and trimmed,
    /// blanks and duplicates are ignored.
    pub fn extend<I, S>(&mut self, category: &str, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = category.trim().to_lowercase();
        if name.is_empty() {
            return;
        }

        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(KeywordCategory {
                    name,
                    keywords: Vec::new(),
                });
                self.categories.len() - 1
            }
        };

        let entry = &mut self.categories[index];
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !entry.keywords.contains(&keyword) {
                entry.keywords.push(keyword);
            }
        }
    }

    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    /// The first category, in table order, with a keyword hit in `normalized`
    ///
    /// `normalized` must already be lowercased. Any substring occurrence is a
    /// hit, so "grandson" is also a hit for "son".
    pub fn first_hit(&self, normalized: &str) -> Option<&KeywordCategory> {
        if normalized.is_empty() {
            return None;
        }

        self.categories.iter().find(|category| {
            category
                .keywords
                .iter()
                .any(|keyword| normalized.contains(keyword.as_str()))
        })
    }
}
