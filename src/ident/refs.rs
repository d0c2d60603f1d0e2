//! Identity reference string builders (spec §6), used by the IR projector
//! and by test fixtures that need the stable textual key for a construct
//! independent of the arena's internal key format.

pub fn field_ref(pkg_path: &str, type_name: &str, field_name: &str) -> String {
    format!("{pkg_path}:{type_name}:{field_name}")
}

pub fn func_ref(pkg_path: &str, name: &str) -> String {
    format!("{pkg_path}:{name}")
}

pub fn method_ref(pkg_path: &str, type_name: &str, method_name: &str) -> String {
    format!("{pkg_path}:{type_name}.{method_name}")
}

pub fn param_ref(pkg_path: &str, func_ref: &str, param_name: &str) -> String {
    format!("{pkg_path}:{func_ref}:{param_name}")
}

pub fn var_ref(pkg_path: &str, func_name: Option<&str>, var_name: &str) -> String {
    match func_name {
        Some(func) => format!("{pkg_path}:{func}:{var_name}"),
        None => format!("{pkg_path}:{var_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_forms() {
        assert_eq!(field_ref("pkg", "Person", "Name"), "pkg:Person:Name");
        assert_eq!(func_ref("pkg", "DoWork"), "pkg:DoWork");
        assert_eq!(method_ref("pkg", "Person", "Greet"), "pkg:Person.Greet");
        assert_eq!(param_ref("pkg", "pkg:DoWork", "x"), "pkg:pkg:DoWork:x");
        assert_eq!(var_ref("pkg", Some("DoWork"), "y"), "pkg:DoWork:y");
        assert_eq!(var_ref("pkg", None, "y"), "pkg:y");
    }
}
