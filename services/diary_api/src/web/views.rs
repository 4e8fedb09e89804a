//! services/diary_api/src/web/views.rs
//!
//! HTML fragments for the two role pages, rendered with Handlebars. Every
//! `{{field}}` goes through Handlebars' HTML escaping, so diary text and advice
//! never reach the page as markup.

use diary_core::{StudentView, TeacherView};
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::ApiError;

const ENTRY_PARTIAL: &str = "entry";
const STUDENT_PAGE: &str = "student_thread";
const TEACHER_PAGE: &str = "teacher_threads";

const ENTRY_TEMPLATE: &str = r#"<div class="entry" data-entry-id="{{id}}">
  <strong>📅 {{date}}</strong><br>
  Word: {{word}}<br>
  Sentence: {{sentence}}<br>
  Kanji: {{kanji}}<br>
  Memo: {{memo}}<br>
{{#if annotation}}
  <div class="advice advice-{{annotation.style}}">👨‍🏫 Advice: {{annotation.text}}</div>
{{/if}}
{{#if advice_input}}
  <form class="advice-form" data-conversation-id="{{advice_input.conversation_id}}" data-entry-id="{{advice_input.entry_id}}">
    <label>Advice: <input type="text" name="advice"></label>
    <button type="submit">Send</button>
  </form>
{{/if}}
  <hr>
</div>
"#;

const STUDENT_TEMPLATE: &str = r#"<p class="greeting">Hello, {{name}}</p>
<div class="diary-list" data-conversation-id="{{thread.conversation_id}}">
{{#each thread.entries}}{{> entry}}{{/each}}
</div>
"#;

const TEACHER_TEMPLATE: &str = r#"<p class="greeting">Hello, {{name}}</p>
<div class="student-posts">
{{#each students}}
<section class="student" data-student-id="{{student}}">
  <h4>{{name}}'s diary</h4>
{{#each thread.entries}}{{> entry}}{{/each}}
</section>
{{/each}}
</div>
"#;

/// The registered page templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, ApiError> {
        let mut registry = Handlebars::new();
        for (name, template) in [
            (ENTRY_PARTIAL, ENTRY_TEMPLATE),
            (STUDENT_PAGE, STUDENT_TEMPLATE),
            (TEACHER_PAGE, TEACHER_TEMPLATE),
        ] {
            registry
                .register_template_string(name, template)
                .map_err(|e| ApiError::Internal(format!("template '{}': {}", name, e)))?;
        }
        Ok(Self { registry })
    }

    pub fn student_page(&self, view: &StudentView) -> Result<String, ApiError> {
        self.render(STUDENT_PAGE, view)
    }

    pub fn teacher_page(&self, view: &TeacherView) -> Result<String, ApiError> {
        self.render(TEACHER_PAGE, view)
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, ApiError> {
        self.registry
            .render(name, data)
            .map_err(|e| ApiError::Internal(format!("render '{}': {}", name, e)))
    }
}
