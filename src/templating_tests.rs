#[cfg(test)]
mod tests {
    use crate::templating::{TemplateEngine, TemplateError};
    use std::fs;
    use tempfile::TempDir;

    async fn setup_test_templates() -> (TempDir, TemplateEngine) {
        let temp_dir = TempDir::new().unwrap();
        let template_path = temp_dir.path();
        let partials_path = template_path.join("partials");
        fs::create_dir_all(&partials_path).unwrap();

        let header_content = r#"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <title>{% if page_title %}{{ page_title }} | {% endif %}{{ site_name }}</title>
</head>
<body>
    <main>"#;
        fs::write(partials_path.join("_header.html.liquid"), header_content).unwrap();

        let footer_content = r#"    </main>
    <footer><p>&copy; {{ current_year }} {{ site_name }}</p></footer>
</body>
</html>"#;
        fs::write(partials_path.join("_footer.html.liquid"), footer_content).unwrap();

        let index_content = r#"{% include "_header.html.liquid" %}
<div class="posts">
{% for post in posts %}<a href="{{ post.url }}"><strong>{{ post.title }}</strong></a>
{% endfor %}
</div>
{% include "_footer.html.liquid" %}"#;
        fs::write(template_path.join("index.html.liquid"), index_content).unwrap();

        let broken_content = r#"{% for post in posts %}unterminated"#;
        fs::write(template_path.join("broken.html.liquid"), broken_content).unwrap();

        let site = liquid::object!({
            "site_name": "spacetraveling",
            "lang": "pt-BR",
            "current_year": 2024,
        });

        let template_engine = TemplateEngine::new(template_path.to_path_buf(), site);

        (temp_dir, template_engine)
    }

    #[tokio::test]
    async fn test_render_with_partials_and_site_globals() {
        let (_temp_dir, engine) = setup_test_templates().await;

        let globals = liquid::object!({
            "page_title": "Posts",
            "posts": vec![
                liquid::object!({"url": "/post/a", "title": "Post A"}),
                liquid::object!({"url": "/post/b", "title": "Post B"}),
            ],
        });

        let html = engine
            .render_template("index.html.liquid", globals)
            .await
            .unwrap();

        assert!(html.contains(r#"<html lang="pt-BR">"#));
        assert!(html.contains("<title>Posts | spacetraveling</title>"));
        assert!(html.contains(r#"<a href="/post/a"><strong>Post A</strong></a>"#));
        assert!(html.contains(r#"<a href="/post/b"><strong>Post B</strong></a>"#));
        assert!(html.contains("&copy; 2024 spacetraveling"));
    }

    #[tokio::test]
    async fn test_page_globals_override_site_globals() {
        let (_temp_dir, engine) = setup_test_templates().await;

        let globals = liquid::object!({
            "site_name": "override",
            "posts": Vec::<liquid::model::Value>::new(),
        });

        let html = engine
            .render_template("index.html.liquid", globals)
            .await
            .unwrap();
        assert!(html.contains("<title>override</title>"));
    }

    #[tokio::test]
    async fn test_missing_template() {
        let (_temp_dir, engine) = setup_test_templates().await;

        let result = engine
            .render_template("nope.html.liquid", liquid::object!({}))
            .await;
        assert!(matches!(result, Err(TemplateError::Io { .. })));
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let (_temp_dir, engine) = setup_test_templates().await;

        let result = engine
            .render_template("broken.html.liquid", liquid::object!({}))
            .await;
        assert!(matches!(result, Err(TemplateError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_template_changes_are_picked_up() {
        let (temp_dir, engine) = setup_test_templates().await;
        let path = temp_dir.path().join("simple.html.liquid");

        fs::write(&path, "version one").unwrap();
        let first = engine
            .render_template("simple.html.liquid", liquid::object!({}))
            .await
            .unwrap();
        assert_eq!(first, "version one");

        // Make sure the modification time moves forward.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        fs::write(&path, "version two").unwrap();

        let second = engine
            .render_template("simple.html.liquid", liquid::object!({}))
            .await
            .unwrap();
        assert_eq!(second, "version two");
    }
}
