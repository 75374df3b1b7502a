// All LLM prompt constants for the analysis pipeline.
// Templates carry literal JSON braces; only the named {tokens} get replaced.

/// Sampling temperature for the initial-analysis exchange.
pub const INITIAL_TEMPERATURE: f32 = 0.2;
/// Sampling temperature for the validation exchange. Lower than the initial
/// stage: the validator refines, it does not ideate.
pub const VALIDATION_TEMPERATURE: f32 = 0.1;
/// Sampling temperature for the global synthesis exchange.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.2;

/// System prompt for the initial opportunity analysis.
pub const INITIAL_SYSTEM: &str = "You are a startup advisor with deep technical expertise. \
    Focus on concrete, actionable insights based solely on the provided data. \
    IMPORTANT: Your response must be valid JSON.";

/// Initial-analysis prompt template.
/// Replace: {job_count}, {cluster_pct}, {metrics_json}, {top_industry}, {top_share}
pub const INITIAL_PROMPT_TEMPLATE: &str = r#"Analyze this cluster of {job_count} job postings (representing {cluster_pct}% of total dataset) based on the following metrics:

Cluster Statistics:
{metrics_json}

Key Observations:
- Dominant industry: {top_industry} ({top_share}% of cluster jobs)

Based on these specific metrics, identify:
1. The most promising and concrete business opportunity
2. Specific pain points that aren't well-addressed by existing solutions
3. Technical requirements and implementation approach
4. Target market and user personas
5. Potential competitive advantages

Focus on being extremely specific. Reference actual technologies, skills, and use cases from the data.
Include specific percentages and numbers in your analysis.

Respond in JSON format:
{
    "primary_opportunity": {
        "description": "Detailed description referencing specific use cases",
        "target_market": "Specific industry/user segment based on the data",
        "competitive_advantage": "Specific advantage based on market gaps in the data"
    },
    "market_validation": {
        "target_industries": ["List specific industries showing interest"]
    }
}"#;

/// System prompt for the validation exchange.
pub const VALIDATION_SYSTEM: &str = "You are a data analyst validating startup opportunities. \
    Be critical and ensure all insights are supported by data. \
    IMPORTANT: Your response must be valid JSON.";

/// Validation prompt template.
/// Replace: {initial_analysis}, {metrics_json}
pub const VALIDATION_PROMPT_TEMPLATE: &str = r#"Review this initial analysis and validate it against the data:

Initial Analysis:
{initial_analysis}

Cluster Metrics:
{metrics_json}

Identify any gaps or inconsistencies. Make the analysis more specific by:
1. Ensuring every claim is supported by the metrics
2. Adding specific numbers and percentages
3. Tying recommendations to actual job requirements
4. Identifying unique patterns in the data

Return a refined version of the analysis with additional validation metrics.
IMPORTANT: Your response must be valid JSON."#;

/// System prompt for the global synthesis exchange.
pub const SYNTHESIS_SYSTEM: &str = "You are an expert at market analysis and startup opportunities. \
    IMPORTANT: Your response must be valid JSON.";

/// Global synthesis prompt template.
/// Replace: {stats_json}, {analyses_json}
pub const SYNTHESIS_PROMPT_TEMPLATE: &str = r#"Based on these cluster analyses and cross-cluster statistics, provide global insights about AI startup opportunities.

Cross-Cluster Statistics:
{stats_json}

Cluster Analyses:
{analyses_json}

Focus on:
1. Major market trends (with specific percentages and numbers)
2. Cross-cluster opportunities (especially where technologies/industries overlap)
3. Most promising startup directions (based on concrete demand signals)
4. Implementation strategies (referencing specific technology stacks)

Highlight:
- Industries with strong presence across multiple clusters
- Unique patterns in different market segments

Respond in JSON format:
{
    "market_trends": [
        {
            "trend": "Trend description",
            "supporting_data": "Specific numbers and percentages",
            "cluster_distribution": "Where this trend appears strongest"
        }
    ],
    "cross_cluster_opportunities": [
        {
            "description": "Description with specific metrics",
            "evidence": "Specific data points supporting this opportunity"
        }
    ]
}"#;
