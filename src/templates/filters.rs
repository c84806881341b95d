//! Custom MiniJinja filters for code generation

use crate::util;
use minijinja::Environment;

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("camel_case", filter_camel_case);
    env.add_filter("line_comment", line_comment);
}

// Filter wrappers that delegate to shared util functions
fn filter_camel_case(value: &str) -> String {
    util::to_camel_case(value)
}

/// Prefix each line with `//` (or the given marker)
fn line_comment(value: &str, marker: Option<&str>) -> String {
    util::line_comment(value, marker.unwrap_or("//"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        let mut env = Environment::new();
        register_filters(&mut env);
        let ctx = minijinja::context! { op => "CloneSafe", text => "a\nb" };
        env.render_str(source, ctx).unwrap()
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(render("{{ op | camel_case }}"), "cloneSafe");
        assert_eq!(render("{{ 'clone_safe' | camel_case }}"), "cloneSafe");
    }

    #[test]
    fn test_line_comment_filter() {
        assert_eq!(render("{{ text | line_comment }}"), "// a\n// b");
        assert_eq!(render("{{ text | line_comment('#') }}"), "# a\n# b");
    }
}
