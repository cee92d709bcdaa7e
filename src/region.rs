//! NOAA bottom-trawl survey regions and their `StdTime` convention.
//!
//! Every region is stamped with one nominal survey date per year: local noon
//! on a fixed month/day, at the region's standard-time UTC offset (no DST).

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Dataset code, also the input file stem (`AI` → `AI.csv`).
    pub code: String,
    pub name: String,
    pub month: u32,
    pub day: u32,
    pub utc_offset_hours: i32,
}

impl RegionInfo {
    fn builtin(code: &str, name: &str, month: u32, day: u32, utc_offset_hours: i32) -> Self {
        RegionInfo {
            code: code.to_string(),
            name: name.to_string(),
            month,
            day,
            utc_offset_hours,
        }
    }

    /// Nominal survey timestamp for `year`, in UTC.
    ///
    /// `None` only for dates that do not exist in that year (29 Feb).
    pub fn std_time(&self, year: u16) -> Option<DateTime<Utc>> {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)?;
        NaiveDate::from_ymd_opt(i32::from(year), self.month, self.day)?
            .and_hms_opt(12, 0, 0)?
            .and_local_timezone(offset)
            .single()
            .map(|t| t.with_timezone(&Utc))
    }

    fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(PipelineError::Config("region code must not be empty".into()));
        }
        // 2000 is a leap year, so this accepts 29 Feb
        if NaiveDate::from_ymd_opt(2000, self.month, self.day).is_none() {
            return Err(PipelineError::Config(format!(
                "region {}: invalid survey date {}/{}",
                self.code, self.month, self.day
            )));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(PipelineError::Config(format!(
                "region {}: UTC offset {} out of range",
                self.code, self.utc_offset_hours
            )));
        }
        Ok(())
    }
}

/// Regions surveyed by the DisMAP data sets.
pub fn builtin_regions() -> Vec<RegionInfo> {
    vec![
        RegionInfo::builtin("AI", "Aleutian Islands", 6, 15, -9),
        RegionInfo::builtin("EBS", "Eastern Bering Sea", 6, 15, -9),
        RegionInfo::builtin("NBS", "Northern Bering Sea", 8, 1, -9),
        RegionInfo::builtin("GOA", "Gulf of Alaska", 6, 15, -9),
        RegionInfo::builtin("GMEX", "Gulf of Mexico", 7, 1, -6),
        RegionInfo::builtin("NEUS_F", "Northeast US Fall", 10, 1, -5),
        RegionInfo::builtin("NEUS_S", "Northeast US Spring", 4, 1, -5),
        RegionInfo::builtin("SEUS_SPR", "Southeast US Spring", 4, 15, -5),
        RegionInfo::builtin("SEUS_SUM", "Southeast US Summer", 7, 15, -5),
        RegionInfo::builtin("SEUS_FAL", "Southeast US Fall", 10, 15, -5),
        RegionInfo::builtin("WC_ANN", "West Coast Annual", 7, 15, -8),
        RegionInfo::builtin("WC_TRI", "West Coast Triennial", 7, 15, -8),
        RegionInfo::builtin("HI", "Hawaii Islands", 9, 1, -10),
    ]
}

/// Lookup table keyed by region code.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: BTreeMap<String, RegionInfo>,
}

impl Default for RegionTable {
    fn default() -> Self {
        RegionTable {
            regions: builtin_regions()
                .into_iter()
                .map(|r| (r.code.clone(), r))
                .collect(),
        }
    }
}

impl RegionTable {
    /// Built-in table with `custom` entries added or replacing same-code rows.
    pub fn with_overrides(custom: &[RegionInfo]) -> Result<Self> {
        let mut table = RegionTable::default();
        for region in custom {
            region.validate()?;
            table.regions.insert(region.code.clone(), region.clone());
        }
        Ok(table)
    }

    pub fn get(&self, code: &str) -> Result<&RegionInfo> {
        self.regions
            .get(code)
            .ok_or_else(|| PipelineError::UnknownRegion(code.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionInfo> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn aleutian_std_time_is_local_noon() {
        let table = RegionTable::default();
        let ai = table.get("AI").unwrap();
        // 12:00 at UTC-9 is 21:00 UTC
        assert_eq!(
            ai.std_time(2012),
            Some(Utc.with_ymd_and_hms(2012, 6, 15, 21, 0, 0).unwrap())
        );
    }

    #[test]
    fn gulf_std_time() {
        let table = RegionTable::default();
        let gmex = table.get("GMEX").unwrap();
        assert_eq!(
            gmex.std_time(1999),
            Some(Utc.with_ymd_and_hms(1999, 7, 1, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn unknown_region() {
        let table = RegionTable::default();
        assert!(matches!(
            table.get("ATLANTIS"),
            Err(PipelineError::UnknownRegion(code)) if code == "ATLANTIS"
        ));
    }

    #[test]
    fn overrides_replace_builtin() {
        let custom = vec![RegionInfo::builtin("AI", "Aleutians (late)", 7, 20, -9)];
        let table = RegionTable::with_overrides(&custom).unwrap();
        assert_eq!(table.len(), builtin_regions().len());
        assert_eq!(table.get("AI").unwrap().month, 7);
    }

    #[test]
    fn overrides_are_validated() {
        let bad = vec![RegionInfo::builtin("XX", "Nowhere", 2, 30, 0)];
        assert!(matches!(
            RegionTable::with_overrides(&bad),
            Err(PipelineError::Config(_))
        ));
        let bad = vec![RegionInfo::builtin("XX", "Nowhere", 2, 1, 20)];
        assert!(RegionTable::with_overrides(&bad).is_err());
    }

    #[test]
    fn leap_day_missing_in_common_year() {
        let r = RegionInfo::builtin("LP", "Leap", 2, 29, 0);
        assert!(r.std_time(2001).is_none());
        assert!(r.std_time(2004).is_some());
    }
}
