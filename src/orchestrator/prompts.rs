//! Prompt builders for each debate phase

use super::transcript::{Dilemma, Transcript};

/// System prompt for the judge
pub const JUDGE_SYSTEM_PROMPT: &str = "You are an impartial judge of ethical debates. You weigh \
the reasoning, consistency, and engagement of each debater, not which option you personally \
prefer. You reward arguments that answer opponents directly and penalize repetition. \
Respond in compact JSON only.";

fn dilemma_block(dilemma: &Dilemma) -> String {
    format!(
        "DILEMMA\nTitle: {}\nOption A: {}\nOption B: {}\nConstraints: {}",
        dilemma.title, dilemma.option_a, dilemma.option_b, dilemma.constraints
    )
}

fn transcript_block(transcript: &Transcript) -> String {
    let mut out = String::from("TRANSCRIPT");
    for turn in &transcript.turns {
        let label = if turn.round == 0 {
            "opening".to_string()
        } else {
            format!("round {}", turn.round)
        };
        out.push_str(&format!(
            "\n[{}] ({}) stance={}: {}",
            turn.agent, label, turn.stance, turn.argument
        ));
    }
    out
}

/// Opening statement request
pub fn opening_prompt(dilemma: &Dilemma) -> String {
    format!(
        "{}\n\n\
         Opening: Choose A or B, and write a clear paragraph (5–8 sentences) that:\n\
         • names your core ethical concept (rule, outcome, or virtue)\n\
         • gives one concrete example or consequence\n\
         • stays consistent with your moral framework\n\
         Respond JSON only: {{\"stance\":\"A|B\",\"argument\":\"<paragraph>\"}}",
        dilemma_block(dilemma)
    )
}

/// Rebuttal request for `agent`, built from every prior turn
pub fn rebuttal_prompt(transcript: &Transcript, agent: &str, round: u32) -> String {
    let opponents: Vec<&str> = transcript
        .agents()
        .into_iter()
        .filter(|name| *name != agent)
        .collect();

    format!(
        "{}\n\n{}\n\n\
         Rebuttal round {}: You are {}. Your opponents are {}.\n\
         Start your argument with the name of the opponent you answer, followed by a comma.\n\
         • rebut at least one opponent's specific claim directly\n\
         • keep or change your stance, and say why\n\
         • stay consistent with your moral framework (4–6 sentences)\n\
         Respond JSON only: {{\"stance\":\"A|B\",\"argument\":\"<paragraph>\"}}",
        dilemma_block(&transcript.dilemma),
        transcript_block(transcript),
        round,
        agent,
        opponents.join(", ")
    )
}

/// Verdict request over the complete transcript
pub fn judge_prompt(transcript: &Transcript) -> String {
    format!(
        "{}\n\n{}\n\n\
         Judge this debate. Pick the single debater ({}) who argued best, explain why in 2–4 \
         sentences, recommend the option the strongest arguments support, and rate your \
         confidence from 0 to 100.\n\
         Respond JSON only: {{\"winner\":\"<name>\",\"rationale\":\"<text>\",\
         \"final_recommendation\":\"A|B\",\"confidence\":<0-100>}}",
        dilemma_block(&transcript.dilemma),
        transcript_block(transcript),
        transcript.agents().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::transcript::Turn;
    use crate::types::Stance;

    fn transcript() -> Transcript {
        let mut transcript = Transcript::new(Dilemma::new(
            "Academic Integrity vs Compassion",
            "Decline",
            "Write the paper",
            "Honor code exists",
        ));
        for agent in ["Deon", "Conse", "Virtue"] {
            transcript.extend([Turn {
                agent: agent.to_string(),
                stance: Stance::A,
                argument: format!("{} opening", agent),
                round: 0,
                is_fallback: false,
                raw: None,
            }]);
        }
        transcript
    }

    #[test]
    fn test_opening_prompt_embeds_dilemma() {
        let prompt = opening_prompt(&transcript().dilemma);
        assert!(prompt.starts_with(
            "DILEMMA\nTitle: Academic Integrity vs Compassion\nOption A: Decline\n\
             Option B: Write the paper\nConstraints: Honor code exists\n\nOpening:"
        ));
        assert!(prompt.ends_with(r#"{"stance":"A|B","argument":"<paragraph>"}"#));
    }

    #[test]
    fn test_rebuttal_prompt_lists_opponents_and_history() {
        let prompt = rebuttal_prompt(&transcript(), "Conse", 1);
        assert!(prompt.contains("Your opponents are Deon, Virtue."));
        assert!(prompt.contains("[Deon] (opening) stance=A: Deon opening"));
        assert!(prompt.contains("[Virtue] (opening) stance=A: Virtue opening"));
        assert!(prompt.contains("Rebuttal round 1"));
    }

    #[test]
    fn test_judge_prompt_names_debaters() {
        let prompt = judge_prompt(&transcript());
        assert!(prompt.contains("(Deon, Conse, Virtue)"));
        assert!(prompt.contains("\"final_recommendation\":\"A|B\""));
    }
}
