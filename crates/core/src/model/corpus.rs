use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::question::Question;

/// A topic under a single company, owning its questions in corpus order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topic {
    pub name: String,
    pub questions: Vec<Question>,
}

/// A company and its topics, in order of first appearance in the corpus.
///
/// Topic names are scoped to the company; the same topic name under two
/// companies names two distinct topics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Company {
    pub name: String,
    pub topics: Vec<Topic>,
}

impl Company {
    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.name == name)
    }

    /// Find or append a topic, preserving first-appearance order.
    pub fn ensure_topic(&mut self, name: &str) -> &mut Topic {
        if let Some(idx) = self.topics.iter().position(|topic| topic.name == name) {
            &mut self.topics[idx]
        } else {
            self.topics.push(Topic {
                name: name.to_owned(),
                questions: Vec::new(),
            });
            self.topics.last_mut().expect("topic was just pushed")
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.questions.len()).sum()
    }
}

/// Parsed corpus: companies in order of first appearance.
///
/// Serializes to the tree shape
/// `{ [company]: { "topics": { [topic]: Question[] } } }` and round-trips
/// through JSON without losing company, topic, or question order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    pub companies: Vec<Company>,
}

impl Corpus {
    #[must_use]
    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|company| company.name == name)
    }

    /// Find or append a company, preserving first-appearance order.
    pub fn ensure_company(&mut self, name: &str) -> &mut Company {
        if let Some(idx) = self.companies.iter().position(|company| company.name == name) {
            &mut self.companies[idx]
        } else {
            self.companies.push(Company {
                name: name.to_owned(),
                topics: Vec::new(),
            });
            self.companies.last_mut().expect("company was just pushed")
        }
    }

    /// Append a question under its own company/topic back-references.
    pub fn push_question(&mut self, question: Question) {
        let company_name = question.company.clone();
        let topic_name = question.topic.clone();
        self.ensure_company(&company_name)
            .ensure_topic(&topic_name)
            .questions
            .push(question);
    }

    pub fn company_names(&self) -> impl Iterator<Item = &str> {
        self.companies.iter().map(|company| company.name.as_str())
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.companies
            .iter()
            .map(Company::question_count)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

// ─── Serialization ─────────────────────────────────────────────────────────────
//
// The tree shape keys companies and topics by name, so the derive would lose
// ordering on the Vec representation. Hand-rolled (de)serialization walks map
// entries in document order instead.

impl Serialize for Corpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.companies.len()))?;
        for company in &self.companies {
            map.serialize_entry(
                &company.name,
                &CompanyBodyRef {
                    topics: &company.topics,
                },
            )?;
        }
        map.end()
    }
}

struct CompanyBodyRef<'a> {
    topics: &'a [Topic],
}

impl Serialize for CompanyBodyRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("Company", 1)?;
        body.serialize_field("topics", &TopicMapRef(self.topics))?;
        body.end()
    }
}

struct TopicMapRef<'a>(&'a [Topic]);

impl Serialize for TopicMapRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for topic in self.0 {
            map.serialize_entry(&topic.name, &topic.questions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Corpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CorpusVisitor;

        impl<'de> Visitor<'de> for CorpusVisitor {
            type Value = Corpus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of company name to company body")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Corpus, A::Error> {
                let mut companies = Vec::new();
                while let Some((name, body)) = access.next_entry::<String, CompanyBody>()? {
                    companies.push(Company {
                        name,
                        topics: body.topics,
                    });
                }
                Ok(Corpus { companies })
            }
        }

        deserializer.deserialize_map(CorpusVisitor)
    }
}

struct CompanyBody {
    topics: Vec<Topic>,
}

impl<'de> Deserialize<'de> for CompanyBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BodyVisitor;

        impl<'de> Visitor<'de> for BodyVisitor {
            type Value = CompanyBody;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a company body with a \"topics\" map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CompanyBody, A::Error> {
                let mut topics = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "topics" {
                        topics = access.next_value::<TopicMap>()?.0;
                    } else {
                        access.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(CompanyBody { topics })
            }
        }

        deserializer.deserialize_map(BodyVisitor)
    }
}

struct TopicMap(Vec<Topic>);

impl<'de> Deserialize<'de> for TopicMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopicsVisitor;

        impl<'de> Visitor<'de> for TopicsVisitor {
            type Value = TopicMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of topic name to question list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TopicMap, A::Error> {
                let mut topics = Vec::new();
                while let Some((name, questions)) = access.next_entry::<String, Vec<Question>>()? {
                    topics.push(Topic { name, questions });
                }
                Ok(TopicMap(topics))
            }
        }

        deserializer.deserialize_map(TopicsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn sample() -> Corpus {
        let mut corpus = Corpus::default();
        for (company, topic, title) in [
            ("ZETA", "ARRAYS", "Two Sum"),
            ("ZETA", "ARRAYS", "Rotate Array"),
            ("ZETA", "STRINGS", "Reverse Words"),
            ("ACME", "GRAPHS", "Course Schedule"),
        ] {
            corpus.push_question(Question {
                title: title.into(),
                difficulty: Difficulty::default(),
                url: String::new(),
                topic: topic.into(),
                company: company.into(),
            });
        }
        corpus
    }

    #[test]
    fn push_question_preserves_first_appearance_order() {
        let corpus = sample();
        let names: Vec<&str> = corpus.company_names().collect();
        assert_eq!(names, vec!["ZETA", "ACME"]);

        let zeta = corpus.company("ZETA").unwrap();
        assert_eq!(zeta.topics[0].name, "ARRAYS");
        assert_eq!(zeta.topics[1].name, "STRINGS");
        assert_eq!(zeta.topics[0].questions[0].title, "Two Sum");
        assert_eq!(zeta.topics[0].questions[1].title, "Rotate Array");
    }

    #[test]
    fn serializes_to_tree_shape() {
        let corpus = sample();
        let json = serde_json::to_string(&corpus).unwrap();
        assert!(json.starts_with("{\"ZETA\":{\"topics\":{\"ARRAYS\":["));
    }

    #[test]
    fn json_round_trip_preserves_structure_and_order() {
        let corpus = sample();
        let json = serde_json::to_string(&corpus).unwrap();
        let back: Corpus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, corpus);
    }

    #[test]
    fn question_count_sums_all_topics() {
        assert_eq!(sample().question_count(), 4);
    }
}
