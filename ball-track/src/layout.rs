//! Discovery of the `<root>/<game>/<clip>/` dataset layout.

use crate::{common::*, utils::Cancellation};

/// A clip directory and its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipDir {
    pub game: String,
    pub clip: String,
    pub path: PathBuf,
}

/// List clip directories two levels below `root`, sorted by game then clip.
pub fn list_clip_dirs(root: &Path, cancel: &Cancellation) -> Result<Vec<ClipDir>> {
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "dataset directory '{}' does not exist",
            root.display()
        )));
    }

    let mut clips = vec![];

    for game_dir in list_subdirs(root)? {
        cancel.check()?;
        let game = dir_name(&game_dir)?;

        for clip_dir in list_subdirs(&game_dir)? {
            cancel.check()?;
            clips.push(ClipDir {
                game: game.clone(),
                clip: dir_name(&clip_dir)?,
                path: clip_dir,
            });
        }
    }

    Ok(clips)
}

/// List files with the extension in `dir`, sorted by path.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&path_str(dir)?),
        extension
    );
    let paths: Vec<_> = glob::glob(&pattern)
        .map_err(|err| Error::Config(err.to_string()))?
        .map(|result| {
            result.map_err(|err| {
                let path = err.path().to_owned();
                Error::io(path, err.into_error())
            })
        })
        .filter_ok(|path| path.is_file())
        .try_collect()?;
    Ok(paths)
}

fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<_> = fs::read_dir(dir)
        .map_err(|err| Error::io(dir, err))?
        .map(|entry| entry.map(|entry| entry.path()))
        .filter_ok(|path| path.is_dir())
        .try_collect()
        .map_err(|err| Error::io(dir, err))?;
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::Config(format!("'{}' is not a valid UTF-8 name", path.display())))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::Config(format!("'{}' is not a valid UTF-8 path", path.display())))
}
