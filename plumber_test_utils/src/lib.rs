mod builder;

use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::de::from_reader;
use walkdir::WalkDir;

pub use builder::{
    offsets, patch_i32, read_i32, BBoxDef, BodyPartDef, BoneControllerDef, BoneDef, EyeBallDef,
    HitboxSetDef, MdlBuilder, ModelDef, TextureDef,
};

/// A JSON description of what decoding a fixture file must produce.
///
/// Fixtures are discovered by extension. Each one is verified against the
/// `.json` file with the same stem next to it; fixtures without one are
/// skipped.
pub trait FileSpec
where
    for<'de> Self: Deserialize<'de>,
{
    type Type;

    fn extension() -> &'static str;

    fn read(file: File) -> Self::Type;

    fn verify(&self, data: Self::Type);

    /// Returns the number of verified fixtures.
    fn verify_from_path(path: &Path) -> usize {
        let mut verified = 0;

        for file in discover_test_files(path, Self::extension()) {
            let spec_file = match File::open(file.path.with_extension("json")) {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => panic!("failed to open spec for {}: {e}", file.name),
            };

            eprintln!("Verifying against {}", file.name);

            let data = Self::read(File::open(&file.path).unwrap());
            let spec: Self = from_reader(BufReader::new(spec_file)).unwrap();

            spec.verify(data);
            verified += 1;
        }

        verified
    }
}

struct TestFile {
    name: String,
    path: PathBuf,
}

fn discover_test_files(path: &Path, extension: &str) -> Vec<TestFile> {
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(path).unwrap();
            let name = relative
                .to_string_lossy()
                .strip_suffix(extension)?
                .to_owned();

            Some(TestFile {
                name,
                path: entry.into_path(),
            })
        })
        .collect()
}
