// Helpers for literal SQL text and comma-separated parameter lists.

/// Removes `/* ... */` comments. Best effort: string literals are not
/// recognized, and an unterminated comment runs to the end of the text.
pub fn strip_block_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// First keyword of `sql` once comments and surrounding whitespace are removed.
pub fn leading_keyword(sql: &str) -> String {
    strip_block_comments(sql)
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}

pub fn starts_with_select(sql: &str) -> bool {
    leading_keyword(sql) == "SELECT"
}

/// Whether a statement produces a result set rather than running for effect.
pub fn returns_rows(sql: &str) -> bool {
    matches!(
        leading_keyword(sql).as_str(),
        "SELECT" | "WITH" | "VALUES" | "FROM" | "SHOW" | "DESCRIBE" | "SUMMARIZE" | "CALL"
    )
}

/// Splits `a, b ,c` into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_block_comments() {
        assert_eq!(
            strip_block_comments("/* header */ SELECT a /* inline */ FROM t"),
            " SELECT a  FROM t"
        );
        assert_eq!(strip_block_comments("SELECT 1 /* open"), "SELECT 1 ");
        assert_eq!(strip_block_comments("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_starts_with_select() {
        assert!(starts_with_select("SELECT * FROM t"));
        assert!(starts_with_select("  select 1"));
        assert!(starts_with_select("/* leading\n comment */\n\tSelect a FROM t"));
        assert!(!starts_with_select("DELETE FROM t"));
        assert!(!starts_with_select("SELECTED"));
        assert!(!starts_with_select("-- SELECT\nDROP TABLE t"));
        assert!(!starts_with_select(""));
    }

    #[test]
    fn test_returns_rows() {
        assert!(returns_rows("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!returns_rows("CREATE TABLE t (a INT)"));
        assert!(!returns_rows("INSERT INTO t VALUES (1)"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list(" , "), Vec::<String>::new());
    }
}
