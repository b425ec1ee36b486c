//! Classification of free-form download input.

/// URI scheme prefixes treated as direct resource locators.
pub const LOCATOR_SCHEMES: &[&str] = &["http://", "https://"];

/// What the user asked to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
	/// A direct resource locator, sent as `url`.
	Locator(String),
	/// Free text to search for, sent as `query`.
	Query(SearchQuery),
}

impl Input {
	/// Trims `raw` and classifies it. Blank input yields `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return None;
		}
		Some(classify(trimmed))
	}

	pub fn is_locator(&self) -> bool {
		matches!(self, Input::Locator(_))
	}

	pub fn as_str(&self) -> &str {
		match self {
			Input::Locator(url) => url,
			Input::Query(query) => query.as_str(),
		}
	}
}

/// Classifies already-trimmed, non-empty input.
///
/// Anything starting with one of [`LOCATOR_SCHEMES`] (ASCII case-insensitive)
/// is a locator; everything else is a search query.
pub fn classify(input: &str) -> Input {
	if has_locator_scheme(input) {
		Input::Locator(input.to_string())
	} else {
		Input::Query(SearchQuery(input.to_string()))
	}
}

fn has_locator_scheme(input: &str) -> bool {
	LOCATOR_SCHEMES
		.iter()
		.any(|scheme| input.get(..scheme.len()).is_some_and(|head| head.eq_ignore_ascii_case(scheme)))
}

/// Search text, conventionally `"artist - title"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Splits `"artist - title"` on the first ` - `.
	///
	/// Without the separator the artist is empty and the whole query is the title.
	pub fn artist_title(&self) -> (&str, &str) {
		match self.0.split_once(" - ") {
			Some((artist, title)) => (artist.trim(), title.trim()),
			None => ("", self.0.trim()),
		}
	}
}
