/// Strips markdown code-fence markers from a completion and trims it.
///
/// Purely textual: the result is not checked to be SQL, let alone safe SQL.
pub fn sanitize(raw: &str) -> String {
    raw.replace("```sql", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sql_fence() {
        let raw = "```sql\nSELECT category, SUM(amount) FROM sales GROUP BY category;\n```";
        assert_eq!(
            sanitize(raw),
            "SELECT category, SUM(amount) FROM sales GROUP BY category;"
        );
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        assert_eq!(sanitize("  ```\nSELECT 1\n```  \n"), "SELECT 1");
    }

    #[test]
    fn leaves_plain_sql_alone() {
        assert_eq!(sanitize("SELECT * FROM sales"), "SELECT * FROM sales");
    }

    #[test]
    fn removes_markers_anywhere() {
        assert_eq!(sanitize("SELECT ```sql 1 ``` + ```2"), "SELECT  1  + 2");
    }

    #[test]
    fn no_markers_survive_and_result_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "``",
            "````",
            "``````sql",
            "`````sql`",
            "``\n```sql\n``",
            "```sql```sql```",
            "\t```SQL\nselect 1\n```\n",
            "Here is the query:\n```sql\nSELECT date, amount FROM sales\n```\nHope it helps!",
        ];

        for input in inputs {
            let once = sanitize(input);
            assert!(!once.contains("```"), "{input:?} -> {once:?}");
            assert_eq!(once, once.trim());
            assert_eq!(sanitize(&once), once, "{input:?}");
        }
    }
}
