//! Turn a list of files and directories into numbered upload pages.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::models::UploadPage;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tif", "tiff", "png"];

#[derive(Default)]
struct Pair {
    image: Option<PathBuf>,
    page_xml: Option<PathBuf>,
}

/// Collect upload pages from files and (non-recursively) directories.
///
/// Images are paired with the `.xml` file of the same stem. Stems without
/// an image are skipped. Pages are numbered from 1, not 0, in sorted stem
/// order, and a skipped stem does not use up a number: the numbers always
/// run 1..=n.
pub fn collect_pages(paths: &[PathBuf]) -> Result<Vec<UploadPage>> {
    let mut pairs: BTreeMap<String, Pair> = BTreeMap::new();

    for path in paths {
        if path.is_dir() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    classify(&mut pairs, entry.path());
                }
            }
        } else if path.is_file() {
            classify(&mut pairs, path.clone());
        } else {
            debug!(path = %path.display(), "skipping, not a file or directory");
        }
    }

    let mut pages = Vec::new();
    for (stem, pair) in pairs {
        let Some(image) = pair.image else {
            debug!(stem = %stem, "skipping, no image");
            continue;
        };
        let page_nr = pages.len() as u32 + 1;
        pages.push(UploadPage::new(image, pair.page_xml, page_nr)?);
    }
    Ok(pages)
}

fn classify(pairs: &mut BTreeMap<String, Pair>, path: PathBuf) {
    let (Some(stem), Some(ext)) = (stem(&path), extension(&path)) else {
        return;
    };

    if ext == "xml" {
        pairs.entry(stem).or_default().page_xml = Some(path);
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        pairs.entry(stem).or_default().image = Some(path);
    }
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    #[test]
    fn pairs_images_with_xml_by_stem_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.TIF");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "a.xml");
        touch(dir.path(), "c.xml");
        touch(dir.path(), "notes.txt");

        let pages = collect_pages(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].image(), dir.path().join("a.jpg"));
        assert_eq!(pages[0].page_xml(), Some(dir.path().join("a.xml").as_path()));
        assert_eq!(pages[0].page_nr(), 1);
        assert_eq!(pages[1].image(), dir.path().join("b.TIF"));
        assert_eq!(pages[1].page_xml(), None);
        assert_eq!(pages[1].page_nr(), 2);
    }

    #[test]
    fn xml_only_stems_do_not_use_up_page_numbers() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "0000.xml");
        touch(dir.path(), "0001.jpg");
        touch(dir.path(), "0002.jpg");

        let pages = collect_pages(&[dir.path().to_path_buf()]).unwrap();

        let numbers: Vec<u32> = pages.iter().map(|p| p.page_nr()).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(pages[0].image(), dir.path().join("0001.jpg"));
    }

    #[test]
    fn accepts_individual_files() {
        let dir = tempfile::tempdir().unwrap();
        let img = touch(dir.path(), "p2.png");
        let xml = touch(dir.path(), "p2.xml");
        let other = touch(dir.path(), "p1.jpeg");

        let pages = collect_pages(&[img, xml.clone(), other.clone()]).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].image(), other.as_path());
        assert_eq!(pages[1].page_xml(), Some(xml.as_path()));
        assert_eq!(pages[1].page_nr(), 2);
    }

    #[test]
    fn missing_paths_yield_no_pages() {
        let pages = collect_pages(&[PathBuf::from("/nonexistent/scans")]).unwrap();
        assert!(pages.is_empty());
    }
}
