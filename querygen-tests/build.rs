fn main() {
    // Per-table files from [package.metadata.querygen], into $OUT_DIR/queries
    querygen::generate_from_cargo_metadata().expect("query generation failed");

    // The same schema as a single queries.sql, into $OUT_DIR/single
    let out_dir = std::env::var("OUT_DIR").unwrap();
    querygen::QueryGenBuilder::new("../fixtures/migration.sql")
        .output_dir(std::path::Path::new(&out_dir).join("single"))
        .builtin_templates()
        .single_file()
        .generate()
        .expect("single-file generation failed");
}
