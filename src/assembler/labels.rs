//! Localized section labels and letter text
//!
//! One table per supported language, picked from the offer's language code.
//! Unknown codes fall back to English, like the month names in `dates`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Labels {
    pub skills: &'static str,
    pub experience: &'static str,
    pub projects: &'static str,
    pub education: &'static str,
    pub languages: &'static str,
    pub cover_letter: &'static str,
    pub salutation: &'static str,
    /// `{title}`, `{company}`, `{excitement}` and `{attraction}` are filled in
    /// by `Labels::opening`
    pub opening: &'static str,
    pub highlights: &'static str,
    pub projects_intro: &'static str,
    /// `{skills}` is filled in by `Labels::closing`
    pub closing: &'static str,
    pub sign_off: &'static str,
    pub company_fallback: &'static str,
    pub company_excitement: &'static str,
    pub role_attraction: &'static str,
    pub role_attraction_default: &'static str,
    pub fallback_achievements: [&'static str; 3],
}

const EN: Labels = Labels {
    skills: "Skills",
    experience: "Experience",
    projects: "Projects",
    education: "Education",
    languages: "Languages",
    cover_letter: "Cover letter",
    salutation: "Dear Hiring Manager,",
    opening: "I am applying for the {title} position at {company}. I am drawn to {excitement}, \
              and the role appeals to me because {attraction}.",
    highlights: "Highlights of my background:",
    projects_intro: "Projects that show how I would approach the work:",
    closing: "I would bring hands-on experience with {skills}, and I would welcome the chance \
              to discuss how I can contribute to your team.",
    sign_off: "Sincerely,",
    company_fallback: "your company",
    company_excitement: "the work being done at {company}",
    role_attraction: "it builds directly on my experience with {skills}",
    role_attraction_default: "it matches the direction I want to grow in",
    fallback_achievements: [
        "Developed scalable software solutions",
        "Collaborated effectively in cross-functional teams",
        "Implemented data-driven decision making processes",
    ],
};

const FR: Labels = Labels {
    skills: "Compétences",
    experience: "Expérience professionnelle",
    projects: "Projets",
    education: "Formation",
    languages: "Langues",
    cover_letter: "Lettre de motivation",
    salutation: "Madame, Monsieur,",
    opening: "Je vous propose ma candidature au poste de {title} chez {company}. Je suis \
              attiré(e) par {excitement}, et ce poste m'intéresse car {attraction}.",
    highlights: "Quelques points forts de mon parcours :",
    projects_intro: "Des projets qui illustrent ma façon de travailler :",
    closing: "J'apporterais une expérience concrète de {skills}, et je serais ravi(e) \
              d'échanger sur la manière dont je peux contribuer à votre équipe.",
    sign_off: "Veuillez agréer, Madame, Monsieur, mes salutations distinguées.",
    company_fallback: "votre entreprise",
    company_excitement: "les projets menés chez {company}",
    role_attraction: "il s'appuie directement sur mon expérience en {skills}",
    role_attraction_default: "il correspond à la direction dans laquelle je souhaite évoluer",
    fallback_achievements: [
        "Développement de solutions logicielles évolutives",
        "Collaboration efficace au sein d'équipes pluridisciplinaires",
        "Mise en place de processus de décision fondés sur les données",
    ],
};

const ES: Labels = Labels {
    skills: "Competencias",
    experience: "Experiencia",
    projects: "Proyectos",
    education: "Formación",
    languages: "Idiomas",
    cover_letter: "Carta de presentación",
    salutation: "Estimado equipo de selección:",
    opening: "Les escribo para presentar mi candidatura al puesto de {title} en {company}. Me \
              atrae {excitement}, y el puesto me interesa porque {attraction}.",
    highlights: "Aspectos destacados de mi trayectoria:",
    projects_intro: "Proyectos que muestran cómo abordaría el trabajo:",
    closing: "Aportaría experiencia práctica con {skills}, y me encantaría conversar sobre \
              cómo puedo contribuir a su equipo.",
    sign_off: "Atentamente,",
    company_fallback: "su empresa",
    company_excitement: "el trabajo que se realiza en {company}",
    role_attraction: "se basa directamente en mi experiencia con {skills}",
    role_attraction_default: "encaja con la dirección en la que quiero crecer",
    fallback_achievements: [
        "Desarrollo de soluciones de software escalables",
        "Colaboración eficaz en equipos multidisciplinares",
        "Implantación de procesos de decisión basados en datos",
    ],
};

pub fn labels(language: &str) -> &'static Labels {
    match language {
        "fr" => &FR,
        "es" => &ES,
        _ => &EN,
    }
}

impl Labels {
    pub fn opening(
        &self,
        title: &str,
        company: &str,
        excitement: &str,
        attraction: &str,
    ) -> String {
        fill(
            self.opening,
            &[
                ("title", title),
                ("company", company),
                ("excitement", excitement),
                ("attraction", attraction),
            ],
        )
    }

    pub fn closing(&self, skills: &str) -> String {
        fill(self.closing, &[("skills", skills)])
    }

    pub fn company_excitement(&self, company: &str) -> String {
        fill(self.company_excitement, &[("company", company)])
    }

    pub fn role_attraction(&self, skills: &[&str]) -> String {
        if skills.is_empty() {
            self.role_attraction_default.to_string()
        } else {
            let joined = skills.join(", ");
            fill(self.role_attraction, &[("skills", joined.as_str())])
        }
    }
}

/// Single left-to-right pass; inserted values are not scanned again
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let slot = slots
            .iter()
            .find(|(name, _)| tail.starts_with(name) && tail[name.len()..].starts_with('}'));
        match slot {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
