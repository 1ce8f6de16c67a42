//! Conversion between stored strings and primitive values.
//!
//! Conversions are culture-invariant: `.` is the decimal separator, booleans
//! are `true`/`false` in any case, and surrounding whitespace is ignored.

use crate::error::{ConfigError, Result};

/// A primitive type that can be read from and written to a config value.
pub trait ConfigValue: Sized {
	/// Type name used in conversion errors.
	const TYPE_NAME: &'static str;

	/// Parse a stored value, `None` if it is not a valid `Self`.
	fn parse_value(raw: &str) -> Option<Self>;

	/// Format `self` for storage.
	fn format_value(&self) -> String;
}

/// Parse `raw` as `T`, failing with [`ConfigError::Conversion`].
pub fn parse<T: ConfigValue>(raw: &str) -> Result<T> {
	T::parse_value(raw).ok_or_else(|| ConfigError::Conversion {
		value: raw.to_string(),
		target: T::TYPE_NAME,
	})
}

macro_rules! impl_from_str_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl ConfigValue for $ty {
				const TYPE_NAME: &'static str = stringify!($ty);

				fn parse_value(raw: &str) -> Option<Self> {
					raw.trim().parse().ok()
				}

				fn format_value(&self) -> String {
					self.to_string()
				}
			}
		)*
	};
}

impl_from_str_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ConfigValue for bool {
	const TYPE_NAME: &'static str = "bool";

	fn parse_value(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		if raw.eq_ignore_ascii_case("true") {
			Some(true)
		} else if raw.eq_ignore_ascii_case("false") {
			Some(false)
		} else {
			None
		}
	}

	fn format_value(&self) -> String {
		let text = if *self { "True" } else { "False" };
		text.to_string()
	}
}

impl ConfigValue for char {
	const TYPE_NAME: &'static str = "char";

	fn parse_value(raw: &str) -> Option<Self> {
		let mut chars = raw.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => Some(c),
			_ => None,
		}
	}

	fn format_value(&self) -> String {
		self.to_string()
	}
}

impl ConfigValue for String {
	const TYPE_NAME: &'static str = "String";

	fn parse_value(raw: &str) -> Option<Self> {
		Some(raw.to_string())
	}

	fn format_value(&self) -> String {
		self.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_integers() {
		assert_eq!(parse::<i32>("255").unwrap(), 255);
		assert_eq!(parse::<i64>(" -12 ").unwrap(), -12);
		assert_eq!(parse::<u8>("200").unwrap(), 200);
	}

	#[test]
	fn test_parse_float_is_culture_invariant() {
		assert!((parse::<f64>("18.5").unwrap() - 18.5).abs() < 1e-9);
		assert!(parse::<f64>("18,5").is_err());
	}

	#[test]
	fn test_parse_bool_ignores_case() {
		assert!(parse::<bool>("True").unwrap());
		assert!(parse::<bool>("TRUE").unwrap());
		assert!(!parse::<bool>("false").unwrap());
		assert!(parse::<bool>("yes").is_err());
	}

	#[test]
	fn test_conversion_error_names_target_type() {
		let err = parse::<u16>("-1").unwrap_err();
		match err {
			ConfigError::Conversion { value, target } => {
				assert_eq!(value, "-1");
				assert_eq!(target, "u16");
			}
			other => panic!("Expected Conversion error, got {other:?}"),
		}
	}

	#[test]
	fn test_format_values() {
		assert_eq!(768i32.format_value(), "768");
		assert_eq!(14.5f64.format_value(), "14.5");
		assert_eq!(true.format_value(), "True");
		assert_eq!('x'.format_value(), "x");
	}

	#[test]
	fn test_char_requires_single_character() {
		assert_eq!(parse::<char>("a").unwrap(), 'a');
		assert!(parse::<char>("ab").is_err());
		assert!(parse::<char>("").is_err());
	}
}
