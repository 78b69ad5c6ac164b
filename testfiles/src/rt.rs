use std::collections::BTreeSet;

use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub rs: String,
    pub dir: String,
    /// The first spec is the test input; the rest are snapshots.
    pub arg_specs: Vec<ArgSpec>,
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub suffix: String,
}

/// Compares the files the test was expanded for against the files present
/// now. Panics when a file was added or removed (the test needs to be
/// recompiled) or when a snapshot has lost its input.
pub fn check(config: &WalkConfig, expect_matched_file_names_list: Vec<String>) {
    check2(config, expect_matched_file_names_list).unwrap_or_else(|e| panic!("{}", e));
}

fn check2(
    config: &WalkConfig,
    expect_matched_file_names_list: Vec<String>,
) -> Result<(), std::io::Error> {
    let expect_matched_file_names = expect_matched_file_names_list
        .into_iter()
        .collect::<BTreeSet<_>>();
    let matched_file_names = matched_file_names(config)?;

    if expect_matched_file_names != matched_file_names {
        // Touch the file containing the test so that cargo re-expands it
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        utime::set_file_times(&config.rs, now as i64, now as i64)?;

        let missing = expect_matched_file_names
            .difference(&matched_file_names)
            .collect::<Vec<_>>();
        let extra = matched_file_names
            .difference(&expect_matched_file_names)
            .collect::<Vec<_>>();
        panic!(
            "Changes detected in testcases. Please rerun the test.\n  missing: {:?}\n  extra: {:?}",
            missing, extra
        )
    }

    let orphans = orphaned_snapshots(config, &matched_file_names);
    if !orphans.is_empty() {
        panic!(
            "Snapshots without a test input in {}: {:?}",
            config.dir, orphans
        );
    }
    Ok(())
}

fn matched_file_names(config: &WalkConfig) -> Result<BTreeSet<String>, std::io::Error> {
    let mut matched_file_names = BTreeSet::new();
    for entry in WalkDir::new(&config.dir).sort_by_file_name() {
        let entry = entry?;
        let file_name = entry
            .path()
            .strip_prefix(&config.dir)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let file_name = file_name.to_str().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Non-UTF8 file name")
        })?;
        if config
            .arg_specs
            .iter()
            .any(|arg_spec| file_name.ends_with(&arg_spec.suffix))
        {
            matched_file_names.insert(file_name.to_owned());
        }
    }
    Ok(matched_file_names)
}

fn orphaned_snapshots(config: &WalkConfig, file_names: &BTreeSet<String>) -> Vec<String> {
    let (input, snapshots) = match config.arg_specs.split_first() {
        Some(specs) => specs,
        None => return vec![],
    };
    file_names
        .iter()
        .filter(|file_name| {
            snapshots.iter().any(|spec| {
                file_name
                    .strip_suffix(&spec.suffix)
                    .map_or(false, |stem| {
                        !file_names.contains(&format!("{}{}", stem, input.suffix))
                    })
            })
        })
        .cloned()
        .collect()
}
