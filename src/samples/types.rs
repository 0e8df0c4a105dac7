/// One sample directory, identified by the part of its name after the
/// prefix shared by every sample in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Suffix distinguishing this sample from the others
    pub id: String,
    /// Full directory name (`prefix` + `id`)
    pub dir_name: String,
}

/// Samples found in the working directory, in natural order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    /// Longest leading substring shared by all sample directory names
    pub common_prefix: String,
    pub samples: Vec<Sample>,
}

impl SampleSet {
    /// Build the set from directory names that are already sorted
    pub fn from_sorted_names(names: Vec<String>, common_prefix: String) -> Self {
        let samples = names
            .into_iter()
            .map(|dir_name| Sample {
                id: dir_name[common_prefix.len()..].to_string(),
                dir_name,
            })
            .collect();

        SampleSet {
            common_prefix,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.id.as_str())
    }
}

impl Sample {
    /// Label written into every record produced from this sample
    pub fn label(&self, stem: &str) -> String {
        format!("{}{}", stem, self.id)
    }
}
