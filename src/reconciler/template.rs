//! Deterministic title and body rendering for the pre-release PR.
use serde::Serialize;

use crate::Result;

pub const DEFAULT_TITLE_TEMPLATE: &str =
    "chore(release): {{ name }}@{{ bumped_version }}";

pub const DEFAULT_BODY_TEMPLATE: &str = r#"Merging this pull request publishes `{{ name }}@{{ bumped_version }}`.

| | |
|---|---|
| Repository version | `{{ version }}` |
| Next version | `{{ bumped_version }}` |
| Latest published | `{{ published_version }}` |
| Built from | {{ commit_sha }} |

The diff below compares the published package with the repository folder.
{%- if truncated %} It was truncated, the full diff is in the run log.{% endif %}

<details open>
<summary>Diff</summary>

````diff
{{ diff }}
````

</details>
"#;

/// Values available to the title and body templates.
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
    pub name: &'a str,
    pub version: String,
    pub bumped_version: String,
    pub published_version: &'a str,
    pub diff: &'a str,
    pub truncated: bool,
    pub commit_sha: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPr {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Templates {
    title: String,
    body: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_TEMPLATE.to_string(),
            body: DEFAULT_BODY_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Templates with optional overrides; `None` keeps the default.
    pub fn new(title: Option<String>, body: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            title: title.unwrap_or(defaults.title),
            body: body.unwrap_or(defaults.body),
        }
    }

    pub fn render(&self, ctx: &TemplateContext) -> Result<RenderedPr> {
        let mut tera = tera::Tera::default();
        tera.add_raw_template("title", &self.title)?;
        tera.add_raw_template("body", &self.body)?;

        let context = tera::Context::from_serialize(ctx)?;

        let title = tera.render("title", &context)?.trim().to_string();
        let body = tera.render("body", &context)?;

        Ok(RenderedPr { title, body })
    }
}
