/**
 * Date resolution fallback chain
 *
 * Sources, in order (first usable one wins):
 * 1. Tag metadata from the file's container
 * 2. Last-write time, unless it falls in the current year
 * 3. Nearest ancestor folder named like a year ("2004" -> 2004-01-01)
 * 4. Last-write time regardless of year (only with UseLastWriteTime)
 */

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use log::debug;
use std::path::Path;

use crate::media::MediaFile;
use crate::metadata;

/// What to do when no trusted source yields a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnresolvedPolicy {
    /// Leave the file untouched and report it.
    #[default]
    Skip,
    /// Fall back to the last-write time even if it is from this year.
    UseLastWriteTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    TagMetadata,
    LastWriteTime,
    FolderName,
    LastWriteFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDateTime,
    pub source: DateSource,
}

pub struct DateResolver {
    policy: UnresolvedPolicy,
    current_year: i32,
}

impl DateResolver {
    pub fn new(policy: UnresolvedPolicy) -> Self {
        Self::with_current_year(policy, Local::now().year())
    }

    pub fn with_current_year(policy: UnresolvedPolicy, current_year: i32) -> Self {
        Self { policy, current_year }
    }

    /// Runs the fallback chain for one file. `None` means unresolved; the
    /// caller reports it.
    pub fn resolve(&self, file: &MediaFile) -> Option<ResolvedDate> {
        let resolved = self.resolve_inner(file);
        if let Some(r) = &resolved {
            debug!("{}: {} from {:?}", file.path.display(), r.date, r.source);
        }
        resolved
    }

    fn resolve_inner(&self, file: &MediaFile) -> Option<ResolvedDate> {
        match metadata::read_tag_date(&file.path, &file.extension) {
            Ok(Some(date)) => {
                return Some(ResolvedDate { date, source: DateSource::TagMetadata });
            }
            Ok(None) => {}
            Err(e) => debug!("No tag date for {}: {}", file.path.display(), e),
        }

        // A last-write time from this year usually comes from a copy or
        // migration, not from the capture.
        if file.modified.year() != self.current_year {
            return Some(ResolvedDate {
                date: file.modified,
                source: DateSource::LastWriteTime,
            });
        }

        if let Some(date) = folder_year_date(&file.path) {
            return Some(ResolvedDate { date, source: DateSource::FolderName });
        }

        match self.policy {
            UnresolvedPolicy::UseLastWriteTime => Some(ResolvedDate {
                date: file.modified,
                source: DateSource::LastWriteFallback,
            }),
            UnresolvedPolicy::Skip => None,
        }
    }
}

/// January 1 of the year named by the nearest ancestor directory whose
/// name is a bare integer.
pub fn folder_year_date(path: &Path) -> Option<NaiveDateTime> {
    path.ancestors()
        .skip(1)
        .filter_map(|dir| dir.file_name()?.to_str())
        .find_map(|name| {
            let year: i32 = name.trim().parse().ok()?;
            // year 1 is the "unset" year
            if !(2..=9999).contains(&year) {
                return None;
            }
            NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::avi::tests::avi_with_idit;
    use crate::metadata::image::tests::{jpeg_with_exif, DATE_TIME_ORIGINAL};
    use crate::metadata::quicktime::tests::movie_with_creation;
    use filetime::FileTime;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    const THIS_YEAR: i32 = 2026;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    /// Writes `bytes` at `rel` under a fresh temp dir and pins its
    /// last-write time to noon, March 3 of `mtime_year`.
    fn media_at(rel: &str, bytes: &[u8], mtime_year: i32) -> (TempDir, MediaFile) {
        let dir = tempdir().unwrap();
        let path: PathBuf = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();

        let local = NaiveDate::from_ymd_opt(mtime_year, 3, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(local.timestamp(), 0)).unwrap();

        let media = MediaFile::from_path(&path).unwrap();
        (dir, media)
    }

    #[test]
    fn test_tag_date_wins_over_mtime_and_folder() {
        let (_dir, media) = media_at("1999/clip.avi", &avi_with_idit("SAT JUN 12 09:10:11 2010"), 2003);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::TagMetadata);
        assert_eq!(
            resolved.date,
            NaiveDate::from_ymd_opt(2010, 6, 12).unwrap().and_hms_opt(9, 10, 11).unwrap()
        );
    }

    #[test]
    fn test_exif_date_wins_over_mtime_and_folder() {
        let bytes = jpeg_with_exif(&[], &[(DATE_TIME_ORIGINAL, "2011:05:06 07:08:09")]);
        let (_dir, media) = media_at("1999/photo.jpg", &bytes, 2003);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::TagMetadata);
        assert_eq!(
            resolved.date,
            NaiveDate::from_ymd_opt(2011, 5, 6).unwrap().and_hms_opt(7, 8, 9).unwrap()
        );
    }

    #[test]
    fn test_unset_tag_date_falls_through() {
        let (_dir, media) = media_at("misc/clip.avi", &avi_with_idit("MON JAN 01 00:00:00 0001"), 2008);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::LastWriteTime);
        assert_eq!(resolved.date.year(), 2008);
    }

    #[test]
    fn test_quicktime_tag_date() {
        let unix = ymd(2015, 7, 1).and_utc().timestamp();
        let (_dir, media) = media_at("2001/movie.mp4", &movie_with_creation(unix), THIS_YEAR);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::TagMetadata);
        assert_eq!(resolved.date, ymd(2015, 7, 1));
    }

    #[test]
    fn test_old_mtime_used_when_tags_missing() {
        let (_dir, media) = media_at("2004/photo.jpg", b"not an image", 2008);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::LastWriteTime);
        assert_eq!(resolved.date.year(), 2008);
    }

    #[test]
    fn test_folder_year_when_mtime_is_current_year() {
        let (_dir, media) = media_at("archive/2004/vacation/beach/photo.jpg", b"not an image", THIS_YEAR);
        let resolver = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);

        let resolved = resolver.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::FolderName);
        assert_eq!(resolved.date, ymd(2004, 1, 1));
    }

    #[test]
    fn test_unresolved_policy() {
        let (_dir, media) = media_at("misc/photo.jpg", b"not an image", THIS_YEAR);

        let skip = DateResolver::with_current_year(UnresolvedPolicy::Skip, THIS_YEAR);
        assert_eq!(skip.resolve(&media), None);

        let fallback = DateResolver::with_current_year(UnresolvedPolicy::UseLastWriteTime, THIS_YEAR);
        let resolved = fallback.resolve(&media).unwrap();
        assert_eq!(resolved.source, DateSource::LastWriteFallback);
        assert_eq!(resolved.date, media.modified);
    }

    #[test]
    fn test_folder_year_date_walks_up() {
        assert_eq!(folder_year_date(Path::new("/nas/photos/1998/a/b/img.jpg")), Some(ymd(1998, 1, 1)));
        assert_eq!(folder_year_date(Path::new("/nas/2001/1998/img.jpg")), Some(ymd(1998, 1, 1)));
        assert_eq!(folder_year_date(Path::new("/nas/photos/summer/img.jpg")), None);
        assert_eq!(folder_year_date(Path::new("/nas/1/img.jpg")), None);
        assert_eq!(folder_year_date(Path::new("/nas/2004-05/img.jpg")), None);
    }

    #[test]
    fn test_file_name_itself_is_not_a_folder_year() {
        assert_eq!(folder_year_date(Path::new("/nas/photos/2004")), None);
    }
}
