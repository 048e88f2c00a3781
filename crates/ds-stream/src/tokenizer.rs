//! Splits one record into fields

/// Split a record on commas, honoring double quotes.
///
/// Inside quotes a doubled `""` yields one literal quote. Quote characters are
/// not part of the field value, and every field is trimmed after extraction. An
/// unterminated quote keeps the rest of the record in the current field.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(tokenize_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        assert_eq!(tokenize_line("  a , b\t,c \r"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(tokenize_line("a,,c,"), vec!["a", "", "c", ""]);
        assert_eq!(tokenize_line(""), vec![""]);
    }

    #[test]
    fn test_quoted_comma() {
        assert_eq!(tokenize_line("1,\"Smith, John\",3"), vec!["1", "Smith, John", "3"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(
            tokenize_line("\"He said \"\"hi\"\"\",x"),
            vec!["He said \"hi\"", "x"]
        );
        assert_eq!(tokenize_line("\"\"\"\""), vec!["\""]);
    }

    #[test]
    fn test_empty_quoted_field() {
        assert_eq!(tokenize_line("a,\"\",c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_unterminated_quote_swallows_rest() {
        assert_eq!(tokenize_line("1,\"open,2,3"), vec!["1", "open,2,3"]);
    }

    #[test]
    fn test_embedded_newline() {
        assert_eq!(tokenize_line("1,\"line one\nline two\""), vec!["1", "line one\nline two"]);
    }

    #[test]
    fn test_multibyte_content() {
        assert_eq!(tokenize_line("café,\"naïve, ok\""), vec!["café", "naïve, ok"]);
    }
}
