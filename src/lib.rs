//! Persona Interview - Topic-driven interview engine
//!
//! Walks an interviewee through a fixed curriculum of life-story topics,
//! asking an LLM for one question at a time, turning its replies into
//! structured question/answer turns and saving progress between sessions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
