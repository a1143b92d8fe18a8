use super::chart::{
    AxisConfig, AxisStyle, ChartConfig, Interpolation, MarkKind, MarkStyle, MeltConfig, Overlay,
    RowFilter, Scale, SortConfig,
};
use super::narrative::{Block, Bullet};
use super::table::{ColumnType, TableSchema};

/// Year the source dataset stops part-way through.
pub const PARTIAL_YEAR: &str = "2023";

/// A CSV file in the data directory and the columns it must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub file_name: &'static str,
    pub schema: TableSchema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionChart {
    pub source: TableSource,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionTemplate {
    pub key: &'static str,
    pub intro: Vec<Block>,
    pub chart: Option<SectionChart>,
    pub commentary: Vec<Block>,
}

impl SectionTemplate {
    fn narrative(key: &'static str, intro: Vec<Block>) -> Self {
        Self {
            key,
            intro,
            chart: None,
            commentary: Vec::new(),
        }
    }

    fn charted(
        key: &'static str,
        intro: Vec<Block>,
        source: TableSource,
        config: ChartConfig,
        commentary: Vec<Block>,
    ) -> Self {
        Self {
            key,
            intro,
            chart: Some(SectionChart { source, config }),
            commentary,
        }
    }

    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.intro
            .iter()
            .chain(self.commentary.iter())
            .filter_map(|block| match block {
                Block::Image { source, .. } => Some(source.as_str()),
                _ => None,
            })
    }
}

/// The fixed, ordered catalogue of report sections.
#[derive(Debug, Clone)]
pub struct ReportBlueprint {
    title: String,
    byline: String,
    sections: Vec<SectionTemplate>,
}

impl ReportBlueprint {
    pub fn new(
        title: impl Into<String>,
        byline: impl Into<String>,
        sections: Vec<SectionTemplate>,
    ) -> Self {
        Self {
            title: title.into(),
            byline: byline.into(),
            sections,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            "GitHub Repository Analysis",
            "by Naama Bejerano",
            standard_sections(),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn byline(&self) -> &str {
        &self.byline
    }

    pub fn sections(&self) -> &[SectionTemplate] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&SectionTemplate> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn table_sources(&self) -> impl Iterator<Item = &TableSource> {
        self.sections
            .iter()
            .filter_map(|section| section.chart.as_ref().map(|chart| &chart.source))
    }

    /// Whether `file_name` is an image some section displays.
    pub fn references_image(&self, file_name: &str) -> bool {
        self.sections
            .iter()
            .flat_map(|section| section.image_sources())
            .any(|source| source == file_name)
    }
}

fn standard_sections() -> Vec<SectionTemplate> {
    vec![
        SectionTemplate::narrative(
            "goals",
            vec![
                Block::heading(2, "Goals and Notes"),
                Block::bullets(vec![
                    Bullet::new("Analyze GitHub repository data to highlight interesting information from the data."),
                    Bullet::new("Uses the version 2 dataset (repository_data.csv) from the Kaggle GitHub Dataset.")
                        .linked("Kaggle GitHub Dataset", "https://www.kaggle.com/datasets/nikhil25803/github-dataset/data?select=repository_data.csv"),
                    Bullet::new("The dataset is too large to process while rendering, so every chart reads a summary CSV produced offline. The script behind each chart is linked in its heading.")
                        .nested(1),
                ]),
            ],
        ),
        SectionTemplate::narrative(
            "data_cleaning",
            vec![
                Block::heading(2, "Data Cleaning"),
                Block::bullets(vec![
                    Bullet::new("Ensure the dataset is valid and note which rows or cells to exclude."),
                    Bullet::new("Count unique rows to check for repetition (none found), count empty cells, and check the range of numeric values and dates."),
                    Bullet::new("Key findings:"),
                    Bullet::new("The data runs from 1/1/2009 until 1/21/2023; patterns based on months, years, or seasons exclude data from 2023.")
                        .nested(1),
                    Bullet::new("47 percent of the license column is empty (1378200 cells), so observations about licenses only pertain to less than half of the data.")
                        .nested(1),
                    Bullet::link("Data Cleaning Code", "https://drive.google.com/file/d/1RoIzXc8o3G_Uht6wBzg6TdrCkg2aBdON/view?usp=sharing"),
                ]),
            ],
        ),
        SectionTemplate::charted(
            "top_repositories",
            vec![
                Block::heading(2, "Top 5 Most Popular Repositories Overall"),
                Block::paragraph("Popularity is measured by a sum across the values of stars_count, forks_count, watchers, pull_requests, and commit_count."),
            ],
            TableSource {
                file_name: "names_most_pop.csv",
                schema: TableSchema::inferred()
                    .column("name", ColumnType::Text)
                    .column("overall_popularity", ColumnType::Float),
            },
            ChartConfig::new(
                MarkKind::Bar,
                AxisConfig::quantitative("overall_popularity").titled("Overall Popularity"),
                AxisConfig::nominal("name")
                    .titled("Repository Name")
                    .with_label_padding(8),
            )
            .titled("Top Repositories by Overall Popularity")
            .styled(MarkStyle {
                size: Some(15),
                ..MarkStyle::default()
            })
            .colored_by(AxisConfig::nominal("name"))
            .with_tooltip(["name", "overall_popularity"])
            .sorted_by(SortConfig::descending("overall_popularity"))
            .sized(600, 300)
            .without_legend()
            .with_axis_style(AxisStyle {
                title_font_size: Some(14),
                label_font_size: Some(10),
            }),
            vec![
                Block::paragraph("The average popularity of a repository in the data set is 742.765680095382."),
                Block::finding("The most popular repository is significantly more popular than those that follow, and the overall average is much lower."),
            ],
        ),
        SectionTemplate::narrative(
            "language_trends",
            vec![
                Block::heading(2, "Trends based on Programming Language"),
                Block::bullets(vec![Bullet::new(
                    "About 7.5 percent of the rows are not included since the primary_language column is empty.",
                )]),
            ],
        ),
        SectionTemplate::charted(
            "language_popularity",
            vec![Block::linked_heading(
                3,
                "Average Popularity by Programming Language",
                "https://drive.google.com/file/d/1O6yax1ct8qw2zJ_rVd4yl7QBd3bY3JaA/view?usp=sharing",
            )],
            TableSource {
                file_name: "average_popularity_by_language.csv",
                schema: TableSchema::inferred()
                    .column("primary_language", ColumnType::Categorical)
                    .column("overall_popularity", ColumnType::Float),
            },
            ChartConfig::new(
                MarkKind::Bar,
                AxisConfig::nominal("primary_language").titled("Programming Languages"),
                AxisConfig::quantitative("overall_popularity").titled("Average Popularity"),
            )
            .sorted_by(SortConfig::descending("overall_popularity"))
            .filtered(RowFilter::drop_missing(["primary_language"])),
            vec![
                Block::finding("The most popular repositories have primary languages commonly associated with documentation."),
                Block::footnote("Popularity in this case is measured by a sum across the values of stars_count, forks_count, watchers, pull_requests, and commit_count."),
                Block::footnote("Rows where any of the above values are empty are excluded (only the commit_count column has empty cells, .065 percent of the data)."),
            ],
        ),
        SectionTemplate::charted(
            "language_share_over_time",
            vec![Block::linked_heading(
                3,
                "Percent of Repositories Created by Language Over Time",
                "https://drive.google.com/file/d/1Cpks-MrerlyeKUa888Fgvlc8aj9rGqmz/view?usp=sharing",
            )],
            TableSource {
                file_name: "top_lang_pop_over_time.csv",
                schema: TableSchema::inferred()
                    .column("created_year", ColumnType::Integer)
                    .remaining(ColumnType::Float),
            },
            ChartConfig::new(
                MarkKind::Line,
                AxisConfig::nominal("created_year").titled("Year"),
                AxisConfig::quantitative("Value").titled("Percent of Repositories Created"),
            )
            .colored_by(AxisConfig::nominal("Programming Language"))
            .melted(MeltConfig::new(
                "created_year",
                "Programming Language",
                "Value",
            ))
            .sized(600, 400),
            vec![
                Block::finding("There is a clear fall in the popularity of Ruby since 2009 and an extreme rise in the popularity of Python in recent years."),
                Block::footnote("Five of the most used languages that showed interesting trends are highlighted."),
            ],
        ),
        SectionTemplate::narrative(
            "time_trends",
            vec![
                Block::heading(2, "Trends based on Time"),
                Block::bullets(vec![Bullet::new(
                    "Since the data set includes up to 1/21/2023, data from 2023 is excluded when looking at larger trends over years or months.",
                )]),
            ],
        ),
        SectionTemplate::charted(
            "repositories_by_year",
            vec![Block::linked_heading(
                3,
                "Number of Repositories Created Over Time",
                "https://drive.google.com/file/d/1ek3YMuSprsIheXT-93jpZ1vavjrjabXx/view?usp=sharing",
            )],
            TableSource {
                file_name: "repositories_by_year.csv",
                // The upstream export leaves the count column unnamed as `0`.
                schema: TableSchema::inferred()
                    .column("created_year", ColumnType::Integer)
                    .column("0", ColumnType::Integer),
            },
            ChartConfig::new(
                MarkKind::Area,
                AxisConfig::nominal("created_year").titled("Year"),
                AxisConfig::quantitative("0").titled("# Repositories Created"),
            )
            .styled(MarkStyle {
                color: Some("steelblue".into()),
                opacity: Some(0.8),
                interpolate: Some(Interpolation::Linear),
                outline: true,
                ..MarkStyle::default()
            })
            .filtered(RowFilter::exclude("created_year", PARTIAL_YEAR))
            .sized(600, 400),
            vec![Block::finding(
                "There is a steady increase since 2009 at a relatively consistent rate, and the peak appears to be in 2020. The Covid-19 pandemic kept people in their homes and was most disruptive during 2020, which offers an explanation for the stark increase and the decrease since.",
            )],
        ),
        SectionTemplate::charted(
            "repositories_by_season",
            vec![Block::linked_heading(
                3,
                "Average Number of Repositories Created Per Season",
                "https://drive.google.com/file/d/12Tga-F2_DcStsfBuJ_t6YfCAoSsnUzxz/view?usp=sharing",
            )],
            TableSource {
                file_name: "average_repositories_by_season.csv",
                schema: TableSchema::inferred()
                    .column("Season", ColumnType::Categorical)
                    .column("Average Repositories", ColumnType::Float),
            },
            ChartConfig::new(
                MarkKind::Bar,
                AxisConfig::nominal("Season"),
                AxisConfig::quantitative("Average Repositories"),
            )
            .titled("Log Base 2 Transformed Average Repositories by Season")
            .styled(MarkStyle {
                size: Some(40),
                ..MarkStyle::default()
            })
            .with_y_scale(Scale::Log { base: 2 })
            .with_tooltip(["Season", "Average Repositories"])
            .with_overlay(Overlay {
                mark: MarkKind::Line,
                color: Some("blue".into()),
            })
            .sized(400, 500),
            vec![Block::finding(
                "The most repositories are created in the spring and the fewest in the winter. The data has no information on the dates users interact with a repository, which would be interesting to know as well.",
            )],
        ),
        SectionTemplate::narrative(
            "further_analysis",
            vec![
                Block::heading(2, "Further Analysis"),
                Block::bullets(vec![
                    Bullet::new("The dataset contains a large amount of information and many more analyses could be done, such as:"),
                    Bullet::new("Comparisons between the version 1 and version 2 datasets.").nested(1),
                    Bullet::new("Analysis of the licenses:").nested(1),
                    Bullet::new("Popularity of a repository based on its license.").nested(2),
                    Bullet::new("Amount of interactivity a repository receives (sum of commit_count and pull_count) based on its license.").nested(2),
                ]),
            ],
        ),
        SectionTemplate::narrative(
            "not_highlighted",
            vec![
                Block::heading(2, "Analyses Conducted but not Highlighted"),
                Block::bullets(vec![Bullet::new(
                    "These analyses did not provide valuable insight to the same extent as the highlighted data above. They are included here for reference.",
                )]),
            ],
        ),
        SectionTemplate::charted(
            "repositories_by_month",
            vec![Block::linked_heading(
                3,
                "Average Number of Repositories Created by Month",
                "https://drive.google.com/file/d/1ro52B3Eyf1I4UDG-fDYD5gKhE16WAKKP/view?usp=sharing",
            )],
            TableSource {
                file_name: "avg_rep_month.csv",
                schema: TableSchema::inferred()
                    .column("Month", ColumnType::Categorical)
                    .column("Average Repositories", ColumnType::Float),
            },
            ChartConfig::new(
                MarkKind::Bar,
                AxisConfig::nominal("Month"),
                AxisConfig::quantitative("Average Repositories"),
            )
            .titled("Average Repositories Created Per Month")
            .with_tooltip(["Month", "Average Repositories"])
            .sized(600, 400),
            vec![Block::paragraph(
                "The graph of repositories created by season provided clearer insight into trends in the data.",
            )],
        ),
        SectionTemplate::narrative(
            "languages_per_repository",
            vec![
                Block::linked_heading(
                    3,
                    "Popularity by Number of Languages Used per Repository",
                    "https://drive.google.com/file/d/1u90Pqb_mi_ufWC_2JCOq0BAJ7v5TgpcB/view?usp=sharing",
                ),
                Block::image(
                    "languages_per_repository.png",
                    "Popularity by number of languages used per repository",
                ),
                Block::paragraph("The data processing was too dense to produce this plot while rendering the report."),
            ],
        ),
    ]
}
