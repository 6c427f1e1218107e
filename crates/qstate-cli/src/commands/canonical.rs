use qstate_kernel::canonicalize;
use serde_json::json;

pub fn run(names: Vec<String>, json_output: bool) {
    if json_output {
        let items: Vec<_> = names
            .iter()
            .map(|name| json!({ "name": name, "canonicalName": canonicalize(name) }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&items).expect("json serialization")
        );
    } else {
        for name in &names {
            println!("{}", canonicalize(name));
        }
    }
}
