use crate::event::PeriodMarker;
use crate::names::{PlayerId, normalize_name};
use crate::stats::Action;
use crate::vocab::tables::{ActorRule, VocabTable};
use crate::vocab::{Substitution, Vocabulary};

/// A [`Vocabulary`] driven by one of the static [`VocabTable`]s.
#[derive(Debug, Clone, Copy)]
pub struct VendorVocabulary {
    table: &'static VocabTable,
}

impl VendorVocabulary {
    pub fn new(table: &'static VocabTable) -> Self {
        Self { table }
    }

    fn actor_text(&self, detail: &str) -> Option<String> {
        match self.table.actor {
            ActorRule::AfterBy {
                strip,
                strip_digits,
                reject,
            } => {
                let (_, after) = detail.split_once(" BY ")?;
                let mut name = after.to_string();
                if strip_digits {
                    name.retain(|c| !c.is_ascii_digit());
                }
                for token in strip {
                    name = name.replace(token, "");
                }
                if reject.iter().any(|r| name.contains(r)) {
                    return None;
                }
                Some(name)
            }
            ActorRule::StripWords { words } => {
                let name = detail
                    .split_whitespace()
                    .filter(|w| !words.contains(w))
                    .collect::<Vec<_>>()
                    .join(" ");
                if name.contains("TEAM") {
                    return None;
                }
                Some(name)
            }
        }
    }
}

impl Vocabulary for VendorVocabulary {
    fn name(&self) -> &str {
        self.table.name
    }

    fn version(&self) -> u32 {
        self.table.version
    }

    fn classify(&self, detail: &str) -> Option<Action> {
        self.table
            .rules
            .iter()
            .find(|r| detail.contains(r.token) && !r.unless.is_some_and(|u| detail.contains(u)))
            .map(|r| r.action)
    }

    fn substitution(&self, detail: &str) -> Option<Substitution> {
        let named = |strip: &str| {
            let name = normalize_name(&detail.replace(strip, ""));
            (!name.is_empty()).then_some(name)
        };

        if detail.contains(self.table.sub_in.marker) {
            named(self.table.sub_in.strip).map(Substitution::In)
        } else if detail.contains(self.table.sub_out.marker) {
            named(self.table.sub_out.strip).map(Substitution::Out)
        } else {
            None
        }
    }

    fn is_substitution_line(&self, detail: &str) -> bool {
        self.table.sub_line.iter().any(|t| detail.contains(t))
            || detail.contains(self.table.sub_in.marker)
            || detail.contains(self.table.sub_out.marker)
    }

    fn actor(&self, detail: &str) -> Option<PlayerId> {
        if self.is_substitution_line(detail)
            || PeriodMarker::from_detail(detail) != PeriodMarker::None
            || self.classify(detail).is_none()
        {
            return None;
        }

        let name = normalize_name(&self.actor_text(detail)?);
        if name.is_empty() || name == "TEAM" || name == "." {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::VendorFormat;

    #[test]
    fn test_sidearm_classify() {
        let v = VendorFormat::Sidearm.vocabulary();
        assert_eq!(v.classify("GOOD 3PTR BY SMITH,JOHN"), Some(Action::Made3));
        assert_eq!(v.classify("MISS LAYUP BY SMITH,JOHN"), Some(Action::Missed2));
        assert_eq!(v.classify("REBOUND DEF BY TEAM"), Some(Action::DefensiveRebound));
        assert_eq!(v.classify("GOOD FT BY SMITH,JOHN"), Some(Action::MadeFreeThrow));
        assert_eq!(v.classify("TIMEOUT 30SEC"), None);
    }

    #[test]
    fn test_presto_classify_three() {
        let v = VendorFormat::Presto.vocabulary();
        assert_eq!(v.classify("MADE 3-PT. JUMP SHOT"), Some(Action::Made3));
        assert_eq!(v.classify("MADE JUMP SHOT BY DOE,JANE"), Some(Action::Made2));
        assert_eq!(v.classify("MISSED FREE THROW BY DOE,JANE"), Some(Action::MissedFreeThrow));
    }

    #[test]
    fn test_cbsi_deadball_rebound_not_counted() {
        let v = VendorFormat::Cbsi.vocabulary();
        assert_eq!(v.classify("REBOUND (DEF) BY JONES,TOM"), Some(Action::DefensiveRebound));
        assert_eq!(v.classify("REBOUND (DEF) BY (DEADBALL)"), None);
        assert_eq!(v.classify("TURNOVR BY JONES,TOM"), Some(Action::Turnover));
    }

    #[test]
    fn test_substitutions() {
        let sidearm = VendorFormat::Sidearm.vocabulary();
        assert_eq!(
            sidearm.substitution("SUB IN BY SMITH,JOHN"),
            Some(Substitution::In("SMITH.JOHN".into()))
        );
        assert_eq!(
            sidearm.substitution("SUB OUT BY SMITH,JOHN"),
            Some(Substitution::Out("SMITH.JOHN".into()))
        );

        let presto = VendorFormat::Presto.vocabulary();
        assert_eq!(
            presto.substitution("DOE,JANE ENTERS THE GAME"),
            Some(Substitution::In("DOE.JANE".into()))
        );
        assert_eq!(
            presto.substitution("DOE,JANE GOES TO THE BENCH"),
            Some(Substitution::Out("DOE.JANE".into()))
        );

        let cbsi = VendorFormat::Cbsi.vocabulary();
        assert_eq!(
            cbsi.substitution("SUB OUT: JONES,TOM"),
            Some(Substitution::Out("JONES.TOM".into()))
        );
        assert_eq!(cbsi.substitution("GOOD! LAYUP BY JONES,TOM"), None);
    }

    #[test]
    fn test_actor_extraction() {
        let sidearm = VendorFormat::Sidearm.vocabulary();
        assert_eq!(
            sidearm.actor("GOOD LAYUP BY SMITH,JOHN(FASTBREAK)"),
            Some("SMITH.JOHN".into())
        );
        assert_eq!(sidearm.actor("REBOUND DEF BY TEAM"), None);
        assert_eq!(sidearm.actor("SUB IN BY SMITH,JOHN"), None);

        let cbsi = VendorFormat::Cbsi.vocabulary();
        assert_eq!(cbsi.actor("FOUL BY JESSUP,JUSTINIAN (P1T7)"), Some("JESSUP.JUSTINIAN".into()));
        assert_eq!(cbsi.actor("GOOD! LAYUP BY JONES,TOM [FB/PNT]"), Some("JONES.TOM".into()));

        let presto = VendorFormat::Presto.vocabulary();
        assert_eq!(presto.actor("MADE LAYUP BY BYRD,CARL"), Some("BYRD.CARL".into()));
        assert_eq!(presto.actor("DEFENSIVE REBOUND BY TEAM"), None);
        assert_eq!(presto.actor("TIMEOUT MEDIA"), None);
    }
}
