// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_adoc_content(size: usize) -> String {
    let base = "== Section\n\nParagraph with *bold*, _italic_ and `mono` text.\n\n* Bullet point\n** Nested item\n* Another item\n\n[source,rust]\n----\nfn example() {\n    println!(\"Hello\");\n}\n----\n\n";
    format!("= Benchmark\n:sectnums:\n\n{}", base.repeat(size))
}

#[allow(dead_code)]
pub fn generate_table(rows: usize, cols: usize) -> String {
    let mut content = format!("[cols=\"{cols}*\"]\n|===\n");
    for r in 0..rows {
        for c in 0..cols {
            content.push_str(&format!("|r{r}c{c} "));
        }
        content.push('\n');
    }
    content.push_str("|===\n");
    content
}
