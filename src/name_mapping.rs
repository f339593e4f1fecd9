use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};

/// Extension the compiler gives every class artifact.
pub const CLASS_EXTENSION: &str = "class";

/// Separator between an outer type's simple name and a nested type.
pub const NESTED_TYPE_MARKER: char = '$';

/// Logical (resource) paths always use `/`, whatever the host platform.
pub const LOGICAL_SEPARATOR: char = '/';

/// Maps a generated source id such as `./com/acme/gen/Rules.java` to its
/// primary type name `com.acme.gen.Rules`.
pub fn source_id_to_type_name(source_id: &str) -> String {
    let relative = source_id.strip_prefix("./").unwrap_or(source_id);
    strip_extension(relative, LOGICAL_SEPARATOR).replace(LOGICAL_SEPARATOR, ".")
}

/// Inverse of [`type_name_to_physical_path`]: `./com/acme/gen/Rules.class`
/// (platform separators) -> `com.acme.gen.Rules`.
pub fn physical_path_to_type_name(physical_path: &Path) -> String {
    let path = physical_path.to_string_lossy();
    let current_dir = format!(".{}", MAIN_SEPARATOR);
    let relative = path.strip_prefix(current_dir.as_str()).unwrap_or(&path);
    strip_extension(relative, MAIN_SEPARATOR).replace(MAIN_SEPARATOR, ".")
}

/// `com.acme.gen.Rules` -> `com/acme/gen/Rules.class` (platform separators).
pub fn type_name_to_physical_path(type_name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        type_name.replace('.', MAIN_SEPARATOR_STR),
        CLASS_EXTENSION
    ))
}

pub fn logical_path_to_physical_path(logical_path: &str) -> PathBuf {
    PathBuf::from(logical_path.replace(LOGICAL_SEPARATOR, MAIN_SEPARATOR_STR))
}

/// Removes the extension of the last path segment. Dots in parent
/// directories are left alone, and a segment without a dot is returned as is.
pub fn strip_extension(path: &str, separator: char) -> &str {
    let name_start = path.rfind(separator).map_or(0, |i| i + separator.len_utf8());
    match path[name_start..].rfind('.') {
        Some(dot) => &path[..name_start + dot],
        None => path,
    }
}

/// Splits a type name into its package prefix and simple name.
/// Types in the default package have no prefix.
pub fn split_type_name(type_name: &str) -> (Option<&str>, &str) {
    match type_name.rsplit_once('.') {
        Some((package, simple_name)) => (Some(package), simple_name),
        None => (None, type_name),
    }
}

/// Stem of a nested-type artifact belonging to `simple_name`, if `file_name`
/// is one (`Rules$Inner.class` for `Rules` -> `Rules$Inner`).
pub fn nested_type_stem<'a>(file_name: &'a str, simple_name: &str) -> Option<&'a str> {
    let stem = file_name
        .strip_suffix(CLASS_EXTENSION)?
        .strip_suffix('.')?;
    let rest = stem.strip_prefix(simple_name)?;
    rest.starts_with(NESTED_TYPE_MARKER).then_some(stem)
}
