//! Language name → judge language id table (Judge0 CE ids).

/// A language the judge can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Canonical lowercase name used by the editor
    pub name: &'static str,
    pub id: u32,
    pub display: &'static str,
    /// File extensions, without the dot
    pub extensions: &'static [&'static str],
}

const LANGUAGES: &[Language] = &[
    Language { name: "javascript", id: 63, display: "JavaScript (Node.js 12.14.0)", extensions: &["js", "mjs", "cjs"] },
    Language { name: "typescript", id: 74, display: "TypeScript (3.7.4)", extensions: &["ts"] },
    Language { name: "python", id: 71, display: "Python (3.8.1)", extensions: &["py"] },
    Language { name: "java", id: 62, display: "Java (OpenJDK 13.0.1)", extensions: &["java"] },
    Language { name: "c", id: 50, display: "C (GCC 9.2.0)", extensions: &["c", "h"] },
    Language { name: "cpp", id: 54, display: "C++ (GCC 9.2.0)", extensions: &["cpp", "cc", "cxx", "hpp"] },
    Language { name: "csharp", id: 51, display: "C# (Mono 6.6.0.161)", extensions: &["cs"] },
    Language { name: "go", id: 60, display: "Go (1.13.5)", extensions: &["go"] },
    Language { name: "rust", id: 73, display: "Rust (1.40.0)", extensions: &["rs"] },
    Language { name: "ruby", id: 72, display: "Ruby (2.7.0)", extensions: &["rb"] },
    Language { name: "php", id: 68, display: "PHP (7.4.1)", extensions: &["php"] },
    Language { name: "kotlin", id: 78, display: "Kotlin (1.3.70)", extensions: &["kt", "kts"] },
    Language { name: "swift", id: 83, display: "Swift (5.2.3)", extensions: &["swift"] },
    Language { name: "bash", id: 46, display: "Bash (5.0.0)", extensions: &["sh", "bash"] },
    Language { name: "sql", id: 82, display: "SQL (SQLite 3.27.2)", extensions: &["sql"] },
];

const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("node", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("c++", "cpp"),
    ("c#", "csharp"),
    ("cs", "csharp"),
    ("golang", "go"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("kt", "kotlin"),
    ("sh", "bash"),
    ("shell", "bash"),
];

/// All languages, in display order
pub fn supported_languages() -> &'static [Language] {
    LANGUAGES
}

/// Look up a language by name or alias, case-insensitively
pub fn find_language(name: &str) -> Option<&'static Language> {
    let lowered = name.trim().to_ascii_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, target)| *target)
        .unwrap_or(lowered.as_str());
    LANGUAGES.iter().find(|l| l.name == canonical)
}

/// Judge language id for a language name
pub fn language_id(name: &str) -> Option<u32> {
    find_language(name).map(|l| l.id)
}

/// Language for a file extension (without the dot)
pub fn language_for_extension(ext: &str) -> Option<&'static Language> {
    let lowered = ext.trim_start_matches('.').to_ascii_lowercase();
    LANGUAGES.iter().find(|l| l.extensions.iter().any(|e| *e == lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_ids() {
        assert_eq!(language_id("javascript"), Some(63));
        assert_eq!(language_id("Python"), Some(71));
        assert_eq!(language_id("c++"), Some(54));
        assert_eq!(language_id("C#"), Some(51));
        assert_eq!(language_id(" rust "), Some(73));
        assert_eq!(language_id("not-a-real-language"), None);
        assert_eq!(language_id(""), None);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(language_for_extension("py").map(|l| l.name), Some("python"));
        assert_eq!(language_for_extension(".HPP").map(|l| l.name), Some("cpp"));
        assert!(language_for_extension("txt").is_none());
    }

    #[test]
    fn test_table_has_unique_ids_and_names() {
        let langs = supported_languages();
        for (i, a) in langs.iter().enumerate() {
            for b in &langs[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_aliases_point_at_real_languages() {
        for (alias, target) in ALIASES {
            assert!(find_language(target).is_some(), "{} -> {}", alias, target);
            assert_eq!(find_language(alias).map(|l| l.name), Some(*target));
        }
    }
}
