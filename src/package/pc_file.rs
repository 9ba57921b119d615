use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// One parsed `.pc` metadata file.
///
/// Variables and fields are kept exactly as written, unexpanded. A key
/// declared twice keeps the value of its last declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PcFile {
    pub name: String,
    pub path: PathBuf,
    pub vars: IndexMap<String, String>,
    pub fields: IndexMap<String, String>,
}

/// Classification of a single metadata line.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Field(&'a str, &'a str),
    Variable(&'a str, &'a str),
    Skip,
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Line::Skip;
    }

    // A colon before any `=` makes a field: `Cflags: -DX=1` is a field,
    // `url=http://host` is a variable.
    if let Some((key, value)) = line.split_once(':')
        && !key.contains('=')
    {
        return Line::Field(key.trim(), value.trim());
    }
    if let Some((key, value)) = line.split_once('=') {
        return Line::Variable(key.trim(), value.trim());
    }
    Line::Skip
}

impl PcFile {
    /// Parse metadata text. Never fails: malformed lines are skipped.
    pub fn parse(contents: &str, path: &Path) -> Self {
        let mut vars = IndexMap::new();
        let mut fields = IndexMap::new();

        for raw in contents.lines() {
            match classify(raw) {
                Line::Field(key, value) => {
                    fields.insert(key.to_string(), value.to_string());
                }
                Line::Variable(key, value) => {
                    vars.insert(key.to_string(), value.to_string());
                }
                Line::Skip => {}
            }
        }

        let name = fields
            .get("Name")
            .cloned()
            .unwrap_or_else(|| package_name(path));

        PcFile {
            name,
            path: path.to_path_buf(),
            vars,
            fields,
        }
    }

    /// Read and parse a metadata file. An unreadable file yields an empty
    /// package rather than an error.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Self {
        let contents = match runtime.read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Treating {} as empty: {:#}", path.display(), e);
                String::new()
            }
        };
        Self::parse(&contents, path)
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Directory containing the metadata file.
    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// Package name of a metadata file: its base name with the extension stripped.
pub fn package_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    const ZLIB_PC: &str = "\
# zlib pkg-config file
prefix=/usr
exec_prefix=${prefix}
libdir=${exec_prefix}/lib
includedir=${prefix}/include

Name: zlib
Description: zlib compression library
Version: 1.3.1

Requires:
Libs: -L${libdir} -lz
Libs.private: -lm
Cflags: -I${includedir}
";

    #[test]
    fn test_parse_vars_and_fields() {
        let pc = PcFile::parse(ZLIB_PC, Path::new("/lib/pkgconfig/zlib.pc"));

        assert_eq!(pc.name, "zlib");
        assert_eq!(pc.vars.get("prefix").unwrap(), "/usr");
        assert_eq!(pc.vars.get("libdir").unwrap(), "${exec_prefix}/lib");
        assert_eq!(pc.field("Version"), Some("1.3.1"));
        assert_eq!(pc.field("Libs"), Some("-L${libdir} -lz"));
        assert_eq!(pc.field("Libs.private"), Some("-lm"));
        assert_eq!(pc.field("Requires"), Some(""));
        assert_eq!(pc.vars.len(), 4);
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        let pc = PcFile::parse(ZLIB_PC, Path::new("zlib.pc"));
        let keys: Vec<_> = pc.vars.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["prefix", "exec_prefix", "libdir", "includedir"]);
    }

    #[test]
    fn test_parse_last_write_wins() {
        let text = "a=1\na=2\nVersion: 1.0\nVersion: 2.0\n";
        let pc = PcFile::parse(text, Path::new("dup.pc"));
        assert_eq!(pc.vars.get("a").unwrap(), "2");
        assert_eq!(pc.field("Version"), Some("2.0"));
    }

    #[test]
    fn test_parse_name_defaults_to_file_stem() {
        let pc = PcFile::parse("prefix=/opt\n", Path::new("/x/libfoo-1.0.pc"));
        assert_eq!(pc.name, "libfoo-1.0");
    }

    #[test]
    fn test_parse_colon_inside_variable_value() {
        let pc = PcFile::parse("url=http://example.com\n", Path::new("a.pc"));
        assert_eq!(pc.vars.get("url").unwrap(), "http://example.com");
        assert!(pc.fields.is_empty());
    }

    #[test]
    fn test_parse_equals_before_colon_is_variable() {
        let pc = PcFile::parse("a=b:c\nc:d=e\n", Path::new("a.pc"));
        assert_eq!(pc.vars.get("a").unwrap(), "b:c");
        assert_eq!(pc.field("c"), Some("d=e"));
        assert_eq!(pc.vars.len(), 1);
        assert_eq!(pc.fields.len(), 1);
    }

    #[test]
    fn test_parse_equals_inside_field_value() {
        let pc = PcFile::parse("Cflags: -DFOO=1 -I/usr/include\n", Path::new("a.pc"));
        assert_eq!(pc.field("Cflags"), Some("-DFOO=1 -I/usr/include"));
        assert!(pc.vars.is_empty());
    }

    #[test]
    fn test_parse_skips_comments_blank_and_malformed() {
        let text = "# comment\n\n   \njust some words\n  # indented comment\nk = v \n";
        let pc = PcFile::parse(text, Path::new("a.pc"));
        assert!(pc.fields.is_empty());
        assert_eq!(pc.vars.len(), 1);
        assert_eq!(pc.vars.get("k").unwrap(), "v");
    }

    #[test]
    fn test_parse_handles_crlf() {
        let pc = PcFile::parse("prefix=/usr\r\nVersion: 1.0\r\n", Path::new("a.pc"));
        assert_eq!(pc.vars.get("prefix").unwrap(), "/usr");
        assert_eq!(pc.field("Version"), Some("1.0"));
    }

    #[test]
    fn test_dir() {
        let pc = PcFile::parse("", Path::new("/vendor/zlib/zlib.pc"));
        assert_eq!(pc.dir(), PathBuf::from("/vendor/zlib"));
    }

    #[test]
    fn test_load_unreadable_file_is_empty() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/missing/foo.pc");

        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let pc = PcFile::load(&runtime, &path);
        assert_eq!(pc.name, "foo");
        assert!(pc.vars.is_empty());
        assert!(pc.fields.is_empty());
    }
}
