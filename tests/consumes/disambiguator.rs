use accord::{
    consumes::{
        Candidate, CandidateDisposition, CandidateSet, CandidateWhy, ConstraintContext,
        ConsumesDeclaration, Decision, GROUP_DECLARATION_RANK, HANDLER_DECLARATION_RANK,
        disambiguate, select_handler,
    },
    error::SelectionError,
    media::MediaType,
};

fn media(text: &str) -> MediaType {
    MediaType::parse(text).expect("media type should parse")
}

fn constrained(handler: &str, types: &[&str]) -> Candidate {
    Candidate::constrained(
        handler,
        vec![ConsumesDeclaration::new(
            types.iter().map(|text| media(text)).collect(),
            HANDLER_DECLARATION_RANK,
        )],
    )
}

fn context<'a>(set: &'a CandidateSet, content_type: Option<&'a MediaType>) -> ConstraintContext<'a> {
    ConstraintContext::new(set, content_type)
}

#[test]
fn given_matching_request_content_type_when_disambiguating_then_candidate_is_selected() {
    let set = CandidateSet::new(vec![constrained("pets.create", &[
        "application/json",
        "text/xml",
    ])]);

    for request in ["application/json", "application/json;parameter1=12", "text/xml"] {
        let content_type = media(request);
        let disambiguation = disambiguate(&context(&set, Some(&content_type)));
        assert_eq!(
            disambiguation.decision,
            Decision::Selected("pets.create".to_string()),
            "request '{request}' should select the candidate",
        );
        assert_eq!(
            disambiguation.report.outcomes[0].why,
            CandidateWhy::ContentTypeMatch
        );
    }
}

#[test]
fn given_two_constrained_candidates_when_later_one_matches_then_later_is_selected() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json", "text/xml"]),
        constrained("pets.import", &["application/custom"]),
    ]);
    let content_type = media("application/custom");

    let disambiguation = disambiguate(&context(&set, Some(&content_type)));

    assert_eq!(
        disambiguation.decision,
        Decision::Selected("pets.import".to_string())
    );
    let outcomes = &disambiguation.report.outcomes;
    assert_eq!(outcomes[0].disposition, CandidateDisposition::Rejected);
    assert_eq!(outcomes[0].why, CandidateWhy::ContentTypeMismatch);
    assert_eq!(outcomes[1].disposition, CandidateDisposition::Accepted);
}

#[test]
fn given_disjoint_constraints_and_unmatched_content_type_then_unsupported_media_type() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json"]),
        constrained("pets.update", &["application/xml"]),
    ]);
    let content_type = media("text/plain");
    let evaluation_context = context(&set, Some(&content_type));

    let disambiguation = disambiguate(&evaluation_context);

    assert_eq!(disambiguation.decision, Decision::NoMatch);
    for outcome in &disambiguation.report.outcomes {
        assert_eq!(outcome.disposition, CandidateDisposition::Rejected);
    }

    let err = select_handler(&evaluation_context).expect_err("selection should fail");
    assert_eq!(err.status_code(), 415);
    match err {
        SelectionError::UnsupportedMediaType { content_type } => {
            assert_eq!(content_type, "text/plain");
        }
        other => panic!("expected unsupported media type, got {other:?}"),
    }
}

#[test]
fn given_absent_content_type_and_unconstrained_candidate_then_unconstrained_wins() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json"]),
        constrained("pets.update", &["text/xml"]),
        Candidate::unconstrained("pets.catch_all"),
    ]);

    let disambiguation = disambiguate(&context(&set, None));

    assert_eq!(
        disambiguation.decision,
        Decision::Selected("pets.catch_all".to_string())
    );
    let outcomes = &disambiguation.report.outcomes;
    assert_eq!(outcomes[0].why, CandidateWhy::DeferredToUnconstrained);
    assert_eq!(outcomes[1].why, CandidateWhy::DeferredToUnconstrained);
    assert_eq!(outcomes[2].why, CandidateWhy::Unconstrained);
}

#[test]
fn given_absent_content_type_and_single_constrained_candidate_then_it_is_selected() {
    let set = CandidateSet::new(vec![constrained("pets.create", &["application/json"])]);

    let disambiguation = disambiguate(&context(&set, None));

    assert_eq!(
        disambiguation.decision,
        Decision::Selected("pets.create".to_string())
    );
    assert_eq!(
        disambiguation.report.outcomes[0].why,
        CandidateWhy::AbsentContentType
    );
}

#[test]
fn given_absent_content_type_and_multiple_constrained_candidates_then_ambiguous() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json"]),
        constrained("pets.update", &["text/xml"]),
    ]);
    let evaluation_context = context(&set, None);

    let disambiguation = disambiguate(&evaluation_context);

    assert_eq!(
        disambiguation.decision,
        Decision::Ambiguous(vec!["pets.create".to_string(), "pets.update".to_string()])
    );

    let err = select_handler(&evaluation_context).expect_err("selection should fail");
    assert_eq!(err.status_code(), 500);
}

#[test]
fn given_absent_content_type_and_multiple_unconstrained_candidates_then_ambiguity_is_reported() {
    // Deliberately left to an external secondary selection: the surviving
    // handlers are reported in candidate order, no tie-break is applied.
    let set = CandidateSet::new(vec![
        Candidate::unconstrained("pets.list"),
        Candidate::unconstrained("pets.list_legacy"),
    ]);

    let disambiguation = disambiguate(&context(&set, None));

    assert_eq!(
        disambiguation.decision,
        Decision::Ambiguous(vec!["pets.list".to_string(), "pets.list_legacy".to_string()])
    );
}

#[test]
fn given_matching_and_unconstrained_candidates_then_both_accept_and_selection_is_ambiguous() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json"]),
        Candidate::unconstrained("pets.catch_all"),
    ]);
    let content_type = media("application/json");

    let disambiguation = disambiguate(&context(&set, Some(&content_type)));

    assert_eq!(
        disambiguation.decision,
        Decision::Ambiguous(vec!["pets.create".to_string(), "pets.catch_all".to_string()])
    );
}

#[test]
fn given_ranked_declarations_then_highest_rank_replaces_the_group_declaration() {
    let candidate = Candidate::constrained(
        "pets.update",
        vec![
            ConsumesDeclaration::new(vec![media("application/json")], GROUP_DECLARATION_RANK),
            ConsumesDeclaration::new(vec![media("application/xml")], HANDLER_DECLARATION_RANK),
        ],
    );
    let set = CandidateSet::new(vec![candidate]);

    let json = media("application/json");
    let disambiguation = disambiguate(&context(&set, Some(&json)));
    assert_eq!(disambiguation.decision, Decision::NoMatch);
    assert_eq!(
        disambiguation.report.outcomes[0].why,
        CandidateWhy::ContentTypeMismatch
    );

    let xml = media("application/xml");
    let disambiguation = disambiguate(&context(&set, Some(&xml)));
    assert_eq!(
        disambiguation.decision,
        Decision::Selected("pets.update".to_string())
    );
}

#[test]
fn given_identical_context_then_disambiguation_is_deterministic() {
    let set = CandidateSet::new(vec![
        constrained("pets.create", &["application/json"]),
        constrained("pets.update", &["text/xml"]),
        Candidate::unconstrained("pets.catch_all"),
    ]);
    let content_type = media("application/json");
    let evaluation_context = context(&set, Some(&content_type));

    let first = disambiguate(&evaluation_context);
    let second = disambiguate(&evaluation_context);

    assert_eq!(first.decision, second.decision);
    assert_eq!(first.report, second.report);
}

#[test]
fn given_empty_candidate_set_then_no_match() {
    let set = CandidateSet::default();
    let disambiguation = disambiguate(&context(&set, None));
    assert_eq!(disambiguation.decision, Decision::NoMatch);
}
