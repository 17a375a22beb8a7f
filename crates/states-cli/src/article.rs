//! # Article Demo Class
//!
//! A blog article with three states:
//!
//! - `StateDefault`: read access (`getTitle`, `getBody`, `isPublished`).
//! - `Draft`: editing (`setTitle`, `setBody`) and `publishing`, which
//!   moves the article to `Published`.
//! - `Published`: `getFormattedBody`, rendering the BBCode body through the
//!   private helper `formatBody`.
//!
//! A new article is `{StateDefault, Draft}`. An article built from stored
//! data with `is_published: true` starts as `{StateDefault, Published}`.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use states_core::{string_argument, StatesError};
use states_proxy::{DispatchOptions, Proxy, State, StateDefinitionExt, StatedClass};

/// Class name of the demo article.
pub const ARTICLE_CLASS: &str = "Demo::Article";

const BBCODE: [(&str, &str); 5] = [
    ("[br]", "<br/>"),
    ("[b]", "<strong>"),
    ("[/b]", "</strong>"),
    ("[i]", "<em>"),
    ("[/i]", "</em>"),
];

/// Render the supported BBCode tags as HTML.
pub fn format_bbcode(body: &str) -> String {
    BBCODE
        .iter()
        .fold(body.to_string(), |text, (tag, html)| text.replace(tag, html))
}

fn default_state() -> Result<State, StatesError> {
    State::builder("StateDefault")
        .public("getTitle", |this, _| Ok(this.get_or_null("title")))
        .public("getBody", |this, _| Ok(this.get_or_null("body")))
        .public("isPublished", |this, _| {
            Ok(json!(this
                .get("is_published")
                .and_then(Value::as_bool)
                .unwrap_or(false)))
        })
        .build()
}

fn draft_state() -> Result<State, StatesError> {
    State::builder("Draft")
        .public("setTitle", |this, args| {
            let title = string_argument(args, 0)?.to_string();
            this.set("title", title)?;
            Ok(Value::Null)
        })
        .public("setBody", |this, args| {
            let body = string_argument(args, 0)?.to_string();
            this.set("body", body)?;
            Ok(Value::Null)
        })
        .public("publishing", |this, _| {
            this.set("is_published", true)?;
            this.disable_state("Draft");
            this.enable_state("Published")?;
            Ok(Value::Null)
        })
        .build()
}

fn published_state() -> Result<State, StatesError> {
    State::builder("Published")
        .public("getFormattedBody", |this, _| this.call("formatBody", &[]))
        .private("formatBody", |this, _| {
            Ok(json!(format_bbcode(this.get_str("body"))))
        })
        .build()
}

/// Build the article class with `options`.
///
/// # Errors
///
/// Propagates state and class builder errors. The default state named by
/// `options` is only checked when a proxy is created.
pub fn article_class(options: DispatchOptions) -> Result<Arc<StatedClass>, StatesError> {
    StatedClass::builder(ARTICLE_CLASS)
        .options(options)
        .state(default_state()?)
        .state(draft_state()?)
        .state(published_state()?)
        .build()
}

/// A new, empty draft article.
///
/// # Errors
///
/// Returns [`StatesError::StateNotFound`] if the class's default state is
/// not one of the article states.
pub fn new_article(class: &Arc<StatedClass>) -> Result<Proxy, StatesError> {
    create(class, Map::new())
}

/// An article built from stored data. `is_published` selects `Published`
/// over `Draft`.
///
/// # Errors
///
/// Returns [`StatesError::StateNotFound`] if the class's default state is
/// not one of the article states.
pub fn create(class: &Arc<StatedClass>, data: Map<String, Value>) -> Result<Proxy, StatesError> {
    let published = data
        .get("is_published")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let lifecycle = if published { "Published" } else { "Draft" };
    let default_state = class.options().default_state.clone();
    Proxy::with_attributes(class, data, &[default_state.as_str(), lifecycle])
}
