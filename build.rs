use std::{env, fs, path::PathBuf};

const STOPWORDS_SOURCE: &str = "config/stopwords.toml";

fn main() {
    println!("cargo:rerun-if-changed={STOPWORDS_SOURCE}");

    let raw = fs::read_to_string(STOPWORDS_SOURCE).expect("read config/stopwords.toml");
    let table: toml::Table = raw.parse().expect("parse config/stopwords.toml");
    let words = table
        .get("english")
        .and_then(|section| section.get("words"))
        .and_then(|words| words.as_array())
        .expect("config/stopwords.toml must define [english] words = [...]");

    let mut generated = String::from("pub(crate) static ENGLISH: &[&str] = &[\n");
    for word in words {
        let word = word.as_str().expect("stopwords must be strings");
        assert_eq!(
            word,
            word.to_lowercase(),
            "stopword {word:?} must be lowercase"
        );
        generated.push_str(&format!("    {word:?},\n"));
    }
    generated.push_str("];\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR set by cargo"));
    fs::write(out_dir.join("stopwords.rs"), generated).expect("write generated stopwords.rs");
}
