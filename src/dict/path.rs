use std::fmt;

use crate::dict::{FromDictError, Result};

/// One segment of a decode location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
	/// Select a named structure field.
	Field(String),
	/// Select a sequence element by zero-based index.
	Index(usize),
	/// Select a mapping entry; holds the rendered key (`'C'`, `11`).
	Key(String),
}

/// Ordered location inside a decoded value, rendered as `baz.c[3]` or `d['C']`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Empty location.
	pub fn root() -> Self {
		Self::default()
	}

	/// Location consisting of a single field name.
	pub fn field(name: &str) -> Self {
		Self {
			steps: vec![PathStep::Field(name.to_owned())],
		}
	}

	/// Return a copy extended by one trailing step.
	pub fn child(&self, step: PathStep) -> Self {
		let mut steps = Vec::with_capacity(self.steps.len() + 1);
		steps.extend(self.steps.iter().cloned());
		steps.push(step);
		Self { steps }
	}

	/// Insert `step` in front of the existing steps.
	pub fn prepend(&mut self, step: PathStep) {
		self.steps.insert(0, step);
	}

	/// Whether the location has no steps.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Parse dotted field syntax with optional `[index]` and `['key']` selectors.
	pub fn parse(input: &str) -> Result<Self> {
		if input.is_empty() {
			return Err(invalid(input));
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			let start = idx;
			while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
				idx += 1;
			}

			if idx == start {
				return Err(invalid(input));
			}

			steps.push(PathStep::Field(input[start..idx].to_owned()));

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let (step, next) = parse_selector(input, idx)?;
				steps.push(step);
				idx = next;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid(input));
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid(input));
				}
			}
		}

		Ok(Self { steps })
	}
}

/// Parse one selector body starting right after `[`; returns the step and the index after `]`.
fn parse_selector(input: &str, start: usize) -> Result<(PathStep, usize)> {
	let bytes = input.as_bytes();
	let mut idx = start;

	if bytes.get(idx) == Some(&b'\'') {
		idx += 1;
		while idx < bytes.len() && bytes[idx] != b'\'' {
			idx += 1;
		}
		if bytes.get(idx + 1) != Some(&b']') {
			return Err(invalid(input));
		}
		return Ok((PathStep::Key(input[start..=idx].to_owned()), idx + 2));
	}

	let negative = bytes.get(idx) == Some(&b'-');
	if negative {
		idx += 1;
	}
	let digits = idx;
	while idx < bytes.len() && bytes[idx].is_ascii_digit() {
		idx += 1;
	}
	if idx == digits || bytes.get(idx) != Some(&b']') {
		return Err(invalid(input));
	}

	let text = &input[start..idx];
	let step = if negative {
		PathStep::Key(text.to_owned())
	} else {
		PathStep::Index(text.parse::<usize>().map_err(|_| invalid(input))?)
	};
	Ok((step, idx + 1))
}

fn invalid(input: &str) -> FromDictError {
	FromDictError::InvalidFieldPath { path: input.to_owned() }
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, step) in self.steps.iter().enumerate() {
			match step {
				PathStep::Field(name) => {
					if i > 0 {
						f.write_str(".")?;
					}
					f.write_str(name)?;
				}
				PathStep::Index(index) => write!(f, "[{index}]")?,
				PathStep::Key(key) => write!(f, "[{key}]")?,
			}
		}
		Ok(())
	}
}
