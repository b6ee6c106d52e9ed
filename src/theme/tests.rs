//! Tests for the theme engine

use super::*;
use std::fs;
use tempfile::TempDir;
use tera::Context as TeraContext;

fn has_template(engine: &ThemeEngine, name: &str) -> bool {
    engine.tera.get_template_names().any(|t| t == name)
}

fn standard_vars() -> StandardTemplateVars {
    StandardTemplateVars {
        site_name: "Daily Bugle".to_string(),
        current_user: None,
        request_path: "/".to_string(),
        messages: vec![Notice::success("Saved.")],
    }
}

fn empty_form(fields: &[&str]) -> serde_json::Value {
    let mut values = serde_json::Map::new();
    let mut errors = serde_json::Map::new();
    for field in fields {
        values.insert(field.to_string(), serde_json::json!(""));
        errors.insert(field.to_string(), serde_json::json!([]));
    }
    serde_json::json!({ "values": values, "errors": errors, "non_field_errors": [] })
}

#[test]
fn test_embedded_templates_are_loaded() {
    let engine = ThemeEngine::embedded().expect("Failed to load embedded templates");

    for name in [
        "base.html",
        "error.html",
        "news/index.html",
        "news/view_news.html",
        "news/add_news.html",
        "news/register.html",
        "news/login.html",
        "news/mail.html",
    ] {
        assert!(has_template(&engine, name), "missing template {}", name);
    }
}

#[test]
fn test_render_error_page() {
    let engine = ThemeEngine::embedded().unwrap();
    let mut context = TeraContext::new();
    context.insert("status", &404);
    context.insert("message", "Page not found");

    let html = engine
        .render_with_standard_vars("error.html", &context, &standard_vars())
        .expect("Failed to render error page");

    assert!(html.contains("404"));
    assert!(html.contains("Page not found"));
    assert!(html.contains("Daily Bugle"));
    assert!(html.contains("Saved."));
}

#[test]
fn test_render_login_form_escapes_values() {
    let engine = ThemeEngine::embedded().unwrap();
    let mut form = empty_form(&["username", "password"]);
    form["values"]["username"] = serde_json::json!("<script>alert(1)</script>");
    form["errors"]["username"] = serde_json::json!(["This field is required."]);

    let mut context = TeraContext::new();
    context.insert("form", &form);
    context.insert("next", "");
    context.insert("categories", &Vec::<crate::models::CategoryWithCount>::new());
    context.insert("current_category_id", &0);

    let html = engine
        .render_with_standard_vars("news/login.html", &context, &standard_vars())
        .expect("Failed to render login page");

    assert!(html.contains("This field is required."));
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_override_directory_replaces_template() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("error.html"),
        "custom {{ status }} page",
    )
    .unwrap();

    let engine = ThemeEngine::new(Some(temp_dir.path())).expect("Failed to load overrides");
    let mut context = TeraContext::new();
    context.insert("status", &500);

    let html = engine.render("error.html", &context).unwrap();
    assert_eq!(html, "custom 500 page");
    // Templates that are not overridden still come from the binary
    assert!(has_template(&engine, "news/index.html"));
}

#[test]
fn test_override_directory_nested_names() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("news")).unwrap();
    fs::write(temp_dir.path().join("news").join("extra.html"), "extra").unwrap();

    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();
    assert!(has_template(&engine, "news/extra.html"));
}

#[test]
fn test_missing_override_directory_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let engine = ThemeEngine::new(Some(&missing)).expect("Missing directory is not fatal");
    assert!(has_template(&engine, "base.html"));
}

#[test]
fn test_broken_override_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("error.html"), "{% if %}").unwrap();

    assert!(ThemeEngine::new(Some(temp_dir.path())).is_err());
}

#[test]
fn test_render_unknown_template_is_an_error() {
    let engine = ThemeEngine::embedded().unwrap();
    let err = engine.render("nope.html", &TeraContext::new()).unwrap_err();
    assert!(err.to_string().contains("nope.html"));
}

#[test]
fn test_notice_serialization() {
    let json = serde_json::to_value(Notice::error("Failed")).unwrap();
    assert_eq!(json["level"], "error");
    assert_eq!(json["text"], "Failed");
}
