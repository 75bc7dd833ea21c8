/// Compares two strings as slugs, without allocating.
///
/// Two strings are equivalent as slugs when their ASCII alphanumeric
/// characters match pairwise (case-insensitively), while all other characters
/// on both sides are ignored. Under these rules, the following versions of the
/// same key are all equivalent:
///
/// - `"MULTI_WORD_KEY"`
/// - `"MultiWordKey"`
/// - `"multiwordkey"`
/// - `"++multi-word-key!"`
/// - etc.
///
/// This is intended for matching user-provided configuration keys against the
/// keys this crate recognizes, in whichever casing convention the
/// configuration source happens to impose.
pub fn eq_as_slugs(a: &str, b: &str) -> bool {
    let mut iter_a = a.chars().filter(|&c| c.is_ascii_alphanumeric());
    let mut iter_b = b.chars().filter(|&c| c.is_ascii_alphanumeric());

    loop {
        match (iter_a.next(), iter_b.next()) {
            (Some(c1), Some(c2)) => {
                if !c1.eq_ignore_ascii_case(&c2) {
                    return false;
                }
            }
            (None, None) => return true, // both sides reached the end
            _ => return false, // one side reached the end, but the other still has valid characters
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equivalent() {
        assert_eq!(eq_as_slugs("", ""), true);
        assert_eq!(eq_as_slugs("a", "A"), true);
        assert_eq!(eq_as_slugs("abc", "ABC"), true);
        assert_eq!(eq_as_slugs("abc", "a_b_c"), true);
        assert_eq!(eq_as_slugs("abc", "a-b-c"), true);
        assert_eq!(eq_as_slugs("abc", "a b c"), true);
        assert_eq!(eq_as_slugs("abc", "a!b@c#"), true);
        assert_eq!(eq_as_slugs("sectiontitle", "SECTION_TITLE"), true);
        assert_eq!(eq_as_slugs("sectiontitle", "++SectionTitle"), true);
        assert_eq!(eq_as_slugs("abc123", "a_b_c_1_2_3"), true);
        assert_eq!(eq_as_slugs("abc123", "A B C 1 2 3"), true);
        assert_eq!(eq_as_slugs("units", "Unit_S"), true);
        assert_eq!(eq_as_slugs("resign", "re-sign"), true);
        assert_eq!(eq_as_slugs("!!!", ""), true);
        assert_eq!(eq_as_slugs("___", ""), true);
        assert_eq!(eq_as_slugs("   ", ""), true);
        assert_eq!(eq_as_slugs("β", ""), true); // non-ASCII is ignored
        assert_eq!(eq_as_slugs("aβc", "ac"), true);
    }

    #[test]
    fn different() {
        assert_eq!(eq_as_slugs("", "a"), false);
        assert_eq!(eq_as_slugs("a", "b"), false);
        assert_eq!(eq_as_slugs("abc", "abd"), false);
        assert_eq!(eq_as_slugs("abc", "abc1"), false);
        assert_eq!(eq_as_slugs("abc", "abcd"), false);
        assert_eq!(eq_as_slugs("abcd", "abc"), false);
        assert_eq!(eq_as_slugs("abc", "a_b_c_d"), false);
        assert_eq!(eq_as_slugs("abc1", "abc"), false);
        assert_eq!(eq_as_slugs("abc", "aβc"), false);
    }
}
