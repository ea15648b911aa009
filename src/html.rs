//! HTML Templating
//!
//! Views build markup through [`Html`] fragments. Everything interpolated with
//! the [`html!`](crate::html!) macro is escaped unless it already is an
//! [`Html`] value; raw markup needs an explicit [`Html::trusted`].

use serde::{Serialize, Serializer};
use std::fmt::{self, Write};

use crate::money::Money;

/// A fragment of markup that is safe to insert into a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    /// Empty fragment
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Wrap markup that is known to be safe, e.g. a static template
    pub fn trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Escape plain text into a fragment
    pub fn text(text: &str) -> Self {
        let mut out = String::with_capacity(text.len());
        escape_into(text, &mut out);
        Self(out)
    }

    /// Append another renderable value (escaped unless it is `Html`)
    pub fn push<R: Render + ?Sized>(&mut self, value: &R) {
        value.render(&mut self.0);
    }

    /// Concatenate fragments
    pub fn join<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Html>,
    {
        let mut out = String::new();
        for fragment in fragments {
            out.push_str(&fragment.0);
        }
        Self(out)
    }

    /// Render `then` only when `condition` holds
    pub fn when(condition: bool, then: impl FnOnce() -> Html) -> Self {
        if condition {
            then()
        } else {
            Self::new()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Html {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl FromIterator<Html> for Html {
    fn from_iter<I: IntoIterator<Item = Html>>(iter: I) -> Self {
        Html::join(iter)
    }
}

/// Values that can be written into markup
pub trait Render {
    fn render(&self, out: &mut String);
}

impl Render for Html {
    fn render(&self, out: &mut String) {
        out.push_str(&self.0);
    }
}

impl Render for str {
    fn render(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl Render for String {
    fn render(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl Render for Money {
    fn render(&self, out: &mut String) {
        escape_into(&self.to_string(), out);
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, out: &mut String) {
        (**self).render(out);
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self, out: &mut String) {
        if let Some(value) = self {
            value.render(out);
        }
    }
}

macro_rules! render_display {
    ($($ty:ty),*) => {
        $(
            impl Render for $ty {
                fn render(&self, out: &mut String) {
                    let _ = write!(out, "{}", self);
                }
            }
        )*
    };
}

render_display!(u8, u16, u32, u64, usize, i32, i64, bool);

/// Adapter used by [`html!`](crate::html!) to route arguments through [`Render`]
pub struct Escaped<'a, T: ?Sized>(pub &'a T);

impl<T: Render + ?Sized> fmt::Display for Escaped<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.0.render(&mut out);
        f.write_str(&out)
    }
}

/// Format markup, escaping every positional argument.
///
/// Only positional `{}` placeholders are escaped; inline captures such as
/// `{name}` bypass [`Render`] and must not be used.
#[macro_export]
macro_rules! html {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::html::Html::trusted(format!($fmt $(, $crate::html::Escaped(&$arg))*))
    };
}

/// Escape text for use in element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
