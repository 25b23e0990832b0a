use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;

use crate::episode::{EpisodeDescriptor, extract_episode_info, split_extension};
use crate::error::Result;
use crate::naming::generate_name;

/// Extensions eligible for renaming, matched case-insensitively.
const VIDEO_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "m2ts", "vob",
    "iso",
];

/// One entry of a remote directory listing. Never mutated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FsEntry {
    pub name: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Original filename -> new filename, in directory listing order.
pub type RenameMapping = IndexMap<String, String>;

pub trait Authenticator {
    fn login(&mut self) -> Result<()>;
}

pub trait DirectoryLister {
    fn list(&self, path: &str) -> Result<Vec<FsEntry>>;
}

pub trait BatchRenamer {
    /// Rename all mapped files under `src_dir` as one atomic batch.
    fn rename_batch(&self, src_dir: &str, mapping: &RenameMapping) -> Result<()>;
}

/// Build a rename mapping by parsing episode information out of each video
/// filename in the listing. Directories and non-video files are skipped.
pub fn build_rename_mapping(entries: &[FsEntry], template: &str) -> RenameMapping {
    let mut mapping = RenameMapping::new();
    for entry in entries {
        if entry.is_dir {
            continue;
        }
        let Some(ext) = video_extension(&entry.name) else {
            continue;
        };
        let mut info = extract_episode_info(&entry.name);
        info.extension = Some(ext.clone());
        let base = render_or_fallback(&info, template);
        mapping.insert(entry.name.clone(), format!("{base}.{ext}"));
    }
    mapping
}

/// Number the video files 1..N in sorted filename order, for listings whose
/// names carry no usable episode information.
pub fn sequential_mapping(entries: &[FsEntry], template: &str) -> RenameMapping {
    let mut files: Vec<(String, String)> = entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .filter_map(|entry| video_extension(&entry.name).map(|ext| (entry.name.clone(), ext)))
        .collect();
    files.sort();

    let mut mapping = RenameMapping::new();
    for (index, (name, ext)) in files.into_iter().enumerate() {
        let number = index + 1;
        let info = EpisodeDescriptor {
            title: format!("Episode_{number:02}"),
            season: "1".to_string(),
            episode: number.to_string(),
            extension: Some(ext.clone()),
        };
        let base = render_or_fallback(&info, template);
        mapping.insert(name, format!("{base}.{ext}"));
    }
    mapping
}

/// Report the rename plan and, unless this is a dry run, forward it to the
/// rename collaborator. Returns whether anything was (or would be) renamed.
pub fn plan_or_execute<R: BatchRenamer>(
    renamer: &R,
    src_dir: &str,
    mapping: &RenameMapping,
    dry_run: bool,
) -> Result<bool> {
    if mapping.is_empty() {
        println!("No video files found to rename.");
        return Ok(false);
    }

    println!("Rename plan ({} files):", mapping.len());
    for (old_name, new_name) in mapping {
        println!("  {old_name} -> {new_name}");
    }

    if dry_run {
        println!("Dry run - no rename request was sent.");
        return Ok(true);
    }

    renamer.rename_batch(src_dir, mapping)?;
    info!("renamed {} files in {src_dir}", mapping.len());
    Ok(true)
}

/// One full renaming pass: authenticate, list the directory, compute the
/// mapping and plan or execute it.
pub fn rename_episodes_by_pattern<C>(
    client: &mut C,
    path: &str,
    template: &str,
    sequential: bool,
    dry_run: bool,
) -> Result<bool>
where
    C: Authenticator + DirectoryLister + BatchRenamer,
{
    client.login()?;
    info!("scanning {path}");
    let entries = client.list(path)?;
    let mapping = if sequential {
        sequential_mapping(&entries, template)
    } else {
        build_rename_mapping(&entries, template)
    };
    plan_or_execute(client, path, &mapping, dry_run)
}

fn render_or_fallback(info: &EpisodeDescriptor, template: &str) -> String {
    match generate_name(info, template) {
        Ok(base) => base,
        Err(err) => {
            warn!("{err}; keeping raw title for {:?}", info.title);
            info.title.clone()
        }
    }
}

fn video_extension(name: &str) -> Option<String> {
    let (_, ext) = split_extension(name);
    let ext = ext?.to_ascii_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::Error;

    const TEMPLATE: &str = "S{season}E{episode:02d}_{title}";

    fn file(name: &str) -> FsEntry {
        FsEntry {
            name: name.to_string(),
            is_dir: false,
            size: Some(1),
        }
    }

    fn dir(name: &str) -> FsEntry {
        FsEntry {
            name: name.to_string(),
            is_dir: true,
            size: None,
        }
    }

    #[derive(Default)]
    struct RecordingRenamer {
        calls: RefCell<Vec<(String, RenameMapping)>>,
        fail: bool,
    }

    impl BatchRenamer for RecordingRenamer {
        fn rename_batch(&self, src_dir: &str, mapping: &RenameMapping) -> Result<()> {
            if self.fail {
                return Err(Error::Rename("remote rejected the batch".to_string()));
            }
            self.calls
                .borrow_mut()
                .push((src_dir.to_string(), mapping.clone()));
            Ok(())
        }
    }

    #[test]
    fn mapping_skips_directories_and_non_video_files() {
        let entries = vec![
            dir("Season 2"),
            file("Show.S02E01.mkv"),
            file("Show.S02E01.srt"),
            file("cover.jpg"),
            file("README"),
        ];
        let mapping = build_rename_mapping(&entries, TEMPLATE);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["Show.S02E01.mkv"], "S02E01_Show.mkv");
    }

    #[test]
    fn mapping_preserves_listing_order() {
        let entries = vec![
            file("b.S01E02.mkv"),
            file("a.S01E01.mkv"),
            file("c.S01E03.mkv"),
        ];
        let mapping = build_rename_mapping(&entries, TEMPLATE);
        let keys: Vec<&String> = mapping.keys().collect();
        assert_eq!(keys, ["b.S01E02.mkv", "a.S01E01.mkv", "c.S01E03.mkv"]);
    }

    #[test]
    fn extension_is_lowercased_on_the_new_name() {
        let entries = vec![file("Show.S01E01.MKV")];
        let mapping = build_rename_mapping(&entries, TEMPLATE);
        assert_eq!(mapping["Show.S01E01.MKV"], "S01E01_Show.mkv");
    }

    #[test]
    fn format_failure_degrades_to_raw_title() {
        // Episode number too large for u32: the generator fails and the
        // builder keeps the extracted title unchanged.
        let entries = vec![file("Show 1 99999999999.mkv")];
        let mapping = build_rename_mapping(&entries, TEMPLATE);
        assert_eq!(mapping["Show 1 99999999999.mkv"], "Show.mkv");
    }

    #[test]
    fn sequential_mapping_numbers_sorted_files() {
        let entries = vec![
            file("zeta.mkv"),
            dir("extras"),
            file("alpha.mkv"),
            file("notes.txt"),
        ];
        let mapping = sequential_mapping(&entries, TEMPLATE);
        let renamed: Vec<&String> = mapping.values().collect();
        assert_eq!(renamed, ["S01E01_Episode_01.mkv", "S01E02_Episode_02.mkv"]);
        assert_eq!(mapping["alpha.mkv"], "S01E01_Episode_01.mkv");
    }

    #[test]
    fn empty_mapping_reports_false_without_renaming() {
        let renamer = RecordingRenamer::default();
        let ok = plan_or_execute(&renamer, "/tv", &RenameMapping::new(), false).unwrap();
        assert!(!ok);
        assert!(renamer.calls.borrow().is_empty());
    }

    #[test]
    fn dry_run_never_contacts_the_renamer() {
        let renamer = RecordingRenamer::default();
        let mapping = build_rename_mapping(&[file("Show.S01E01.mkv")], TEMPLATE);
        let ok = plan_or_execute(&renamer, "/tv", &mapping, true).unwrap();
        assert!(ok);
        assert!(renamer.calls.borrow().is_empty());
    }

    #[test]
    fn execute_forwards_the_mapping() {
        let renamer = RecordingRenamer::default();
        let mapping = build_rename_mapping(&[file("Show.S01E01.mkv")], TEMPLATE);
        let ok = plan_or_execute(&renamer, "/tv", &mapping, false).unwrap();
        assert!(ok);
        let calls = renamer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/tv");
        assert_eq!(calls[0].1["Show.S01E01.mkv"], "S01E01_Show.mkv");
    }

    #[test]
    fn rename_errors_propagate() {
        let renamer = RecordingRenamer {
            fail: true,
            ..RecordingRenamer::default()
        };
        let mapping = build_rename_mapping(&[file("Show.S01E01.mkv")], TEMPLATE);
        let err = plan_or_execute(&renamer, "/tv", &mapping, false).unwrap_err();
        assert!(matches!(err, Error::Rename(_)));
    }
}
