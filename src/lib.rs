use crate::canvas::Rgb;
use chrono::prelude::*;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;
pub mod bar_race;
pub mod canvas;
pub mod error;
pub mod layout;
pub mod utils;

pub use crate::error::CaseError;

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATE_LEN: usize = 10;
/// date, state, cases and at least one trailing field (deaths)
pub const MIN_FIELDS: usize = 4;

/// The five states drawn as bars, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedState {
    California,
    Texas,
    Florida,
    NewYork,
    Illinois,
}

impl TrackedState {
    pub const ALL: [TrackedState; 5] = [
        TrackedState::California,
        TrackedState::Texas,
        TrackedState::Florida,
        TrackedState::NewYork,
        TrackedState::Illinois,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrackedState::California => "California",
            TrackedState::Texas => "Texas",
            TrackedState::Florida => "Florida",
            TrackedState::NewYork => "New York",
            TrackedState::Illinois => "Illinois",
        }
    }

    /// Exact, case sensitive match on the state name used in the csv.
    pub fn from_name(name: &str) -> Option<TrackedState> {
        TrackedState::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> Rgb {
        match self {
            TrackedState::California => Rgb(206, 218, 245),
            TrackedState::Texas => Rgb(211, 247, 193),
            TrackedState::Florida => Rgb(248, 250, 217),
            TrackedState::NewYork => Rgb(232, 206, 245),
            TrackedState::Illinois => Rgb::ORANGE,
        }
    }
}

/// One data row of the input, borrowed from the line it was split from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRow<'a> {
    pub date: NaiveDate,
    pub state: &'a str,
    pub cases: u64,
}

impl<'a> CaseRow<'a> {
    /// Split a data line on commas.
    /// Field 0 is the date (YYYY-MM-DD), field 1 the state name,
    /// and the cases are the second-to-last field,
    /// so that any trailing column after the count (deaths) is ignored.
    /// `line_no` is only used to report errors.
    pub fn parse(line: &'a str, line_no: usize) -> Result<CaseRow<'a>, CaseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < MIN_FIELDS {
            return Err(CaseError::parse(
                line_no,
                format!(
                    "expected at least {} comma separated fields, found {}",
                    MIN_FIELDS,
                    fields.len()
                ),
                line,
            ));
        }
        let date_field = fields[0];
        if date_field.len() != DATE_LEN {
            return Err(CaseError::parse(line_no, "date is not YYYY-MM-DD", line));
        }
        let date = NaiveDate::parse_from_str(date_field, DATE_FMT)
            .map_err(|e| CaseError::parse(line_no, format!("invalid date ({})", e), line))?;
        let cases_field = fields[fields.len() - 2];
        let cases = cases_field.parse::<u64>().map_err(|e| {
            CaseError::parse(
                line_no,
                format!("invalid case count {:?} ({})", cases_field, e),
                line,
            )
        })?;
        Ok(CaseRow {
            date,
            state: fields[1],
            cases,
        })
    }
}

/// Case counts accumulated for a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    /// Sum over every row of the date, tracked states or not.
    pub total_cases: u64,
    /// Indexed by `TrackedState::index`.
    pub state_counts: [u64; 5],
}

impl Snapshot {
    /// Start an empty snapshot, all counts to zero.
    pub fn new(date: NaiveDate) -> Snapshot {
        Snapshot {
            date,
            total_cases: 0,
            state_counts: [0; 5],
        }
    }

    /// Fold one row into the snapshot.
    /// Every row adds to the total, a tracked state overwrites its slot (last value wins).
    /// Fails, leaving the snapshot untouched, when the total would overflow.
    pub fn apply(&mut self, row: &CaseRow) -> Result<(), String> {
        self.total_cases = self
            .total_cases
            .checked_add(row.cases)
            .ok_or_else(|| format!("total cases for {} overflow", self.date))?;
        if let Some(state) = TrackedState::from_name(row.state) {
            self.state_counts[state.index()] = row.cases;
        }
        Ok(())
    }

    pub fn count(&self, state: TrackedState) -> u64 {
        self.state_counts[state.index()]
    }

    /// Largest of the tracked counts, 0 when all are zero.
    pub fn largest_count(&self) -> u64 {
        self.state_counts.iter().copied().max().unwrap_or(0)
    }
}

/// Lazy reader that turns the date-grouped csv lines into snapshots.
/// A snapshot is emitted when the date changes and, for the last date,
/// when the lines are over. The first line is the header and is skipped.
/// After an error the reader yields nothing else.
pub struct SnapshotReader<B> {
    lines: Lines<B>,
    line_no: usize,
    current: Option<Snapshot>,
    done: bool,
}

impl SnapshotReader<BufReader<File>> {
    /// Open the csv file, distinguishing a missing file from other io errors.
    pub fn from_path<P>(fin: P) -> Result<SnapshotReader<BufReader<File>>, CaseError>
    where
        P: AsRef<Path>,
    {
        let path = fin.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CaseError::FileNotFound(path.to_path_buf()),
            _ => CaseError::Io(e),
        })?;
        Ok(SnapshotReader::new(BufReader::new(file)))
    }
}

impl<B: BufRead> SnapshotReader<B> {
    pub fn new(buf: B) -> SnapshotReader<B> {
        SnapshotReader {
            lines: buf.lines(),
            line_no: 0,
            current: None,
            done: false,
        }
    }

    fn fail(&mut self, e: CaseError) -> Option<Result<Snapshot, CaseError>> {
        self.done = true;
        self.current = None;
        Some(Err(e))
    }
}

impl<B: BufRead> Iterator for SnapshotReader<B> {
    type Item = Result<Snapshot, CaseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(l)) => l,
                Some(Err(e)) if e.kind() == ErrorKind::InvalidData => {
                    let reason = format!("line is not valid UTF-8: {}", e);
                    return self.fail(CaseError::parse(self.line_no + 1, reason, ""));
                }
                Some(Err(e)) => return self.fail(CaseError::Io(e)),
                None => {
                    self.done = true;
                    return self.current.take().map(Ok);
                }
            };
            self.line_no += 1;
            if self.line_no == 1 {
                continue;
            }
            if line.trim().is_empty() {
                debug!("skipping empty line {}", self.line_no);
                continue;
            }
            let row = match CaseRow::parse(&line, self.line_no) {
                Ok(row) => row,
                Err(e) => return self.fail(e),
            };
            if let Some(snapshot) = self.current.as_mut().filter(|s| s.date == row.date) {
                if let Err(reason) = snapshot.apply(&row) {
                    return self.fail(CaseError::parse(self.line_no, reason, &line));
                }
                continue;
            }
            let mut next = Snapshot::new(row.date);
            if let Err(reason) = next.apply(&row) {
                return self.fail(CaseError::parse(self.line_no, reason, &line));
            }
            if let Some(finished) = self.current.replace(next) {
                debug!(
                    "snapshot {}: total {}, tracked {:?}",
                    finished.date, finished.total_cases, finished.state_counts
                );
                return Some(Ok(finished));
            }
        }
    }
}

/// Read the whole csv file, stopping at the first error.
pub fn read_snapshots<P>(fin: P) -> Result<Vec<Snapshot>, CaseError>
where
    P: AsRef<Path>,
{
    SnapshotReader::from_path(fin)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "date,state,fips,cases,deaths\n";

    fn snapshots(data: &str) -> Result<Vec<Snapshot>, CaseError> {
        SnapshotReader::new(Cursor::new(data)).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_case_row_fields() {
        let row = CaseRow::parse("2020-09-01,New York,36,443078,32951", 2).unwrap();
        assert_eq!(row.date, ymd(2020, 9, 1));
        assert_eq!(row.state, "New York");
        assert_eq!(row.cases, 443078);
        // more trailing columns are tolerated, cases is still the second-to-last
        let row = CaseRow::parse("2020-09-01,Texas,48,extra,641,12", 2).unwrap();
        assert_eq!(row.cases, 641);
    }

    #[test]
    fn test_grouping_by_date() {
        let data = format!(
            "{}{}{}{}{}{}",
            HEADER,
            "2020-03-01,California,06,10,0\n",
            "2020-03-01,Texas,48,20,0\n",
            "2020-03-01,Washington,53,30,1\n",
            "2020-03-02,California,06,15,0\n",
            "2020-03-02,Florida,12,5,0\n",
        );
        let mut reader = SnapshotReader::new(Cursor::new(data));
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.date, ymd(2020, 3, 1));
        assert_eq!(first.total_cases, 60);
        assert_eq!(first.state_counts, [10, 20, 0, 0, 0]);
        // the last date is only emitted once the lines are over
        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.date, ymd(2020, 3, 2));
        assert_eq!(second.total_cases, 20);
        assert_eq!(second.state_counts, [15, 0, 5, 0, 0]);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_last_value_wins() {
        let data = format!(
            "{}{}{}",
            HEADER, "2020-04-01,Illinois,17,100,1\n", "2020-04-01,Illinois,17,250,2\n",
        );
        let s = snapshots(&data).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].count(TrackedState::Illinois), 250);
        assert_eq!(s[0].total_cases, 350);
    }

    #[test]
    fn test_untracked_states_only_add_to_total() {
        let data = format!(
            "{}{}{}",
            HEADER, "2020-04-01,Ohio,39,70,1\n", "2020-04-01,Guam,66,3,0\n",
        );
        let s = snapshots(&data).unwrap();
        assert_eq!(s[0].total_cases, 73);
        assert_eq!(s[0].state_counts, [0; 5]);
        assert_eq!(s[0].largest_count(), 0);
    }

    #[test]
    fn test_end_to_end_two_dates() {
        let data = format!(
            "{}{}{}{}{}",
            HEADER,
            "2020-09-01,California,06,100,1\n",
            "2020-09-01,Texas,48,200,2\n",
            "2020-09-01,Oregon,41,50,0\n",
            "2020-09-02,California,06,150,3\n",
        );
        let s = snapshots(&data).unwrap();
        assert_eq!(
            s,
            vec![
                Snapshot {
                    date: ymd(2020, 9, 1),
                    total_cases: 350,
                    state_counts: [100, 200, 0, 0, 0],
                },
                Snapshot {
                    date: ymd(2020, 9, 2),
                    total_cases: 150,
                    state_counts: [150, 0, 0, 0, 0],
                },
            ]
        );
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(snapshots("").unwrap().is_empty());
        assert!(snapshots(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let data = format!(
            "{}{}\n{}\n\n",
            HEADER, "2020-05-01,Florida,12,9,0", "2020-05-01,Florida,12,11,0",
        );
        let s = snapshots(&data).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].count(TrackedState::Florida), 11);
    }

    #[test]
    fn test_non_numeric_count_is_a_parse_error() {
        let data = format!(
            "{}{}{}",
            HEADER, "2020-05-01,Florida,12,9,0\n", "2020-05-01,Texas,48,many,0\n",
        );
        let mut reader = SnapshotReader::new(Cursor::new(data));
        match reader.next() {
            Some(Err(CaseError::Parse { line, text, .. })) => {
                assert_eq!(line, 3);
                assert_eq!(text, "2020-05-01,Texas,48,many,0");
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
        // no partial snapshot after the error
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_short_row_is_a_parse_error() {
        let data = format!("{}{}", HEADER, "2020-05-01,Texas,48\n");
        match snapshots(&data) {
            Err(CaseError::Parse { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("at least 4"), "{}", reason);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_a_parse_error() {
        let data = format!("{}{}", HEADER, "2020-5-1,Texas,48,3,0\n");
        assert!(matches!(snapshots(&data), Err(CaseError::Parse { line: 2, .. })));
        let data = format!("{}{}", HEADER, "2020-13-01,Texas,48,3,0\n");
        assert!(matches!(snapshots(&data), Err(CaseError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_negative_count_is_a_parse_error() {
        let data = format!("{}{}", HEADER, "2020-05-01,Texas,48,-3,0\n");
        assert!(matches!(snapshots(&data), Err(CaseError::Parse { .. })));
    }

    #[test]
    fn test_total_overflow_is_a_parse_error() {
        let data = format!(
            "{}{}{}",
            HEADER,
            "2020-05-01,Texas,48,18000000000000000000,0\n",
            "2020-05-01,Ohio,39,18000000000000000000,0\n",
        );
        let mut reader = SnapshotReader::new(Cursor::new(data));
        match reader.next() {
            Some(Err(CaseError::Parse { line, reason, text })) => {
                assert_eq!(line, 3);
                assert!(reason.contains("overflow"), "{}", reason);
                assert!(text.starts_with("2020-05-01,Ohio"));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_invalid_utf8_line_is_a_parse_error() {
        let data = b"date,state,fips,cases,deaths\n2020-01-01,Ohio,39,\xff,0\n".to_vec();
        let mut reader = SnapshotReader::new(Cursor::new(data));
        match reader.next() {
            Some(Err(CaseError::Parse { line, reason, .. })) => {
                assert_eq!(line, 2);
                assert!(reason.contains("UTF-8"), "{}", reason);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_read_snapshots_from_file() {
        let s = read_snapshots("./test/data.txt").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].date, ymd(2020, 3, 14));
        assert_eq!(s[2].date, ymd(2020, 3, 16));
        assert_eq!(s[2].state_counts, [426, 64, 155, 967, 94]);
        assert_eq!(s[2].total_cases, 426 + 64 + 155 + 967 + 94 + 904);
        for w in s.windows(2) {
            assert!(w[1].date > w[0].date);
        }
    }

    #[test]
    fn test_missing_file() {
        match read_snapshots("./test/does_not_exist.txt") {
            Err(CaseError::FileNotFound(p)) => assert!(p.ends_with("does_not_exist.txt")),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_tracked_state_names() {
        for state in TrackedState::ALL {
            assert_eq!(TrackedState::from_name(state.name()), Some(state));
        }
        assert_eq!(TrackedState::from_name("new york"), None);
        assert_eq!(TrackedState::NewYork.index(), 3);
    }
}
